pub mod ast;
pub mod lexer;
pub mod parse;

pub use ast::{Expr, FunctionDef, Program, Prototype, TopLevel};
pub use parse::{ParseError, parse_program};
