use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use seqalt_lang::{Config, Interpreter, ScriptError};

#[derive(ClapParser)]
#[command(name = "seqalt")]
#[command(about = "seqalt language CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum sequence nesting during evaluation
    #[arg(long, global = true, default_value_t = Config::default().max_depth)]
    max_depth: usize,

    /// Skip the cycle collection after the program finishes
    #[arg(long, global = true)]
    no_gc: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program file, or stdin when no file is given
    Run {
        /// Path to the source file
        file: Option<PathBuf>,
    },
    /// Evaluate inline code
    Eval {
        /// The code to evaluate
        code: String,
    },
    /// Print the parsed AST
    Parse {
        /// Path to the source file, or stdin when omitted
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::default()
        .with_max_depth(cli.max_depth)
        .with_collect_after_run(!cli.no_gc);

    let result = match cli.command {
        Commands::Run { file } => read_source(file.as_deref()).and_then(|src| run(&src, config)),
        Commands::Eval { code } => run(&code, config),
        Commands::Parse { file } => read_source(file.as_deref()).and_then(|src| parse(&src)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so program output on stdout stays clean.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_source(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("error reading {}: {e}", path.display())),
        None => {
            let mut src = String::new();
            io::stdin()
                .read_to_string(&mut src)
                .map_err(|e| format!("error reading stdin: {e}"))?;
            Ok(src)
        }
    }
}

fn run(source: &str, config: Config) -> Result<(), String> {
    let mut interp = Interpreter::new().with_config(config);
    let outcome = match interp.eval_code(source) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(e) => Err(describe(&e)),
    };
    if interp.config().collect_after_run {
        let stats = interp.finish(None);
        tracing::debug!(released = stats.released, "session closed");
    }
    outcome
}

fn parse(source: &str) -> Result<(), String> {
    let interp = Interpreter::new();
    let ast = interp.parse(source).map_err(|errs| describe(&ScriptError::Syntax(errs)))?;
    println!("{ast}");
    Ok(())
}

fn describe(err: &ScriptError) -> String {
    match err {
        ScriptError::Syntax(_) => format!("syntax error:\n{err}"),
        ScriptError::Eval(_) => format!("error: {err}"),
    }
}
