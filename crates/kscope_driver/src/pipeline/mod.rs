mod compile;

pub use compile::{CompileError, CompileOptions, CompileOutput, compile_file, compile_source};
