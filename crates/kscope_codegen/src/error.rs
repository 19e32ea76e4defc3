use inkwell::builder::BuilderError;
use thiserror::Error;

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Semantic errors detected while lowering the AST.
///
/// Every codegen operation returns one of these instead of a value. The error
/// is reported once, by whoever stops propagating it (see
/// [`CodeGenerator::compile`](crate::CodeGenerator::compile)).
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("unknown variable name '{name}'")]
    UnknownVariable { name: String },

    #[error("unknown function referenced: '{name}'")]
    UnknownFunction { name: String },

    #[error("incorrect number of arguments for '{callee}': expected {expected}, found {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid binary operator '{op}'")]
    InvalidOperator { op: char },

    #[error("function '{name}' failed verification")]
    VerificationFailure { name: String },

    #[error("duplicate parameter '{param}' in prototype of '{function}'")]
    DuplicateParameter { function: String, param: String },

    #[error("function '{name}' is already defined")]
    Redefinition { name: String },

    #[error("call to '{callee}' produced no value")]
    VoidCall { callee: String },

    #[error("instruction builder error: {0}")]
    Builder(#[from] BuilderError),
}
