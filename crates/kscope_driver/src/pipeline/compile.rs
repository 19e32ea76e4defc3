use std::io::Write;
use std::path::{Path, PathBuf};

use inkwell::context::Context;
use kscope_codegen::{CodeGenerator, DiagnosticSink, StderrSink};
use kscope_frontend::{ParseError, parse_program};
use thiserror::Error;

/// Compilation options.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name given to the generated LLVM module.
    pub module_name: String,
    /// Print the AST dump before code generation.
    pub dump_ast: bool,
    /// Where to write the IR text; stdout when `None`.
    pub output: Option<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            module_name: "kscope".to_string(),
            dump_ast: false,
            output: None,
        }
    }
}

/// Errors that abort a whole compilation.
///
/// Per-statement codegen failures are not among them: those go to the
/// diagnostics sink and the run continues.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The finished module failed LLVM verification.
    #[error("codegen error: {0}")]
    Codegen(String),
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Textual dump of the final module.
    pub ir: String,
    /// Tree dump, when [`CompileOptions::dump_ast`] is set.
    pub ast_dump: Option<String>,
    /// Functions declared or committed, in statement order.
    pub generated: Vec<String>,
    /// Number of top-level statements that failed to generate.
    pub failed: usize,
}

/// Compile source text to LLVM IR text.
///
/// This runs the full pipeline:
/// 1. Parse (fatal on syntax errors)
/// 2. Optional tree dump
/// 3. Code generation, one statement at a time
/// 4. Module verification and IR dump
pub fn compile_source<D: DiagnosticSink>(
    source: &str,
    options: &CompileOptions,
    diagnostics: D,
) -> Result<CompileOutput, CompileError> {
    let program = parse_program(source)?;
    log::info!("parsed {} top-level statement(s)", program.statements.len());

    let ast_dump = options.dump_ast.then(|| program.dump());

    let context = Context::create();
    let mut codegen = CodeGenerator::new(&context, &options.module_name, diagnostics);
    let report = codegen.compile(&program);
    log::info!(
        "generated {} function(s), {} statement(s) failed",
        report.generated.len(),
        report.failed
    );

    codegen
        .module()
        .verify()
        .map_err(|msg| CompileError::Codegen(msg.to_string()))?;

    Ok(CompileOutput {
        ir: codegen.module().print_to_string().to_string(),
        ast_dump,
        generated: report.generated,
        failed: report.failed,
    })
}

/// Compile a source file, reporting diagnostics on stderr.
///
/// The tree dump (if requested) goes to stdout; the IR goes to
/// `options.output`, or stdout after the tree dump.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let source = std::fs::read_to_string(path)?;
    log::info!("compiling {}", path.display());

    let output = compile_source(&source, options, StderrSink)?;

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    if let Some(dump) = &output.ast_dump {
        stdout.write_all(dump.as_bytes())?;
    }

    match &options.output {
        Some(out_path) => {
            std::fs::write(out_path, &output.ir)?;
            log::info!("IR written to {}", out_path.display());
        }
        None => stdout.write_all(output.ir.as_bytes())?,
    }
    stdout.flush()?;

    Ok(output)
}
