mod pipeline;

pub use pipeline::{CompileError, CompileOptions, CompileOutput, compile_file, compile_source};
