use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use kscope_driver::{CompileOptions, compile_file};

#[derive(Parser, Debug)]
#[command(name = "kscope", version, about = "kscope: expression language to LLVM IR")]
struct Cli {
    /// Input source file to compile.
    input: PathBuf,

    /// Write the LLVM IR to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the parsed tree before generating code.
    #[arg(long)]
    dump_ast: bool,

    /// Log pipeline stages and every generated function to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let module_name = Path::new(&cli.input)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "kscope".to_string());

    let options = CompileOptions {
        module_name,
        dump_ast: cli.dump_ast,
        output: cli.output,
    };

    if !cli.input.exists() {
        eprintln!("error: file not found: {}", cli.input.display());
        process::exit(1);
    }

    match compile_file(&cli.input, &options) {
        Ok(output) => {
            if output.failed > 0 {
                log::info!("{} top-level statement(s) failed to generate", output.failed);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
