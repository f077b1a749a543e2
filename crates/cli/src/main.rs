use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use vesper_core::{diag, parse_units, render::render_module, SourceSet};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Vesper front-end toolchain.
#[derive(Parser)]
#[command(name = "vesper", version, about = "Vesper front-end toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse source files and report diagnostics
    Check {
        /// Source files, parsed together as one batch
        files: Vec<PathBuf>,
    },

    /// Print the canonical declaration rendering of each file
    Decls {
        /// Source files, parsed together as one batch
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Check { files } => cmd_check(&files, cli.output),
        Commands::Decls { files } => cmd_decls(&files),
    };
    process::exit(code);
}

/// Read every file into a batch. All units of one invocation see each
/// other's classes during resolution.
fn load(files: &[PathBuf]) -> Result<SourceSet, i32> {
    let mut set = SourceSet::new();
    for path in files {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                set.add(name, text);
            }
            Err(e) => {
                eprintln!("error: cannot read {}: {}", path.display(), e);
                return Err(2);
            }
        }
    }
    Ok(set)
}

fn cmd_check(files: &[PathBuf], output: OutputFormat) -> i32 {
    let set = match load(files) {
        Ok(set) => set,
        Err(code) => return code,
    };
    let outcomes = parse_units(&set);
    let had_errors = outcomes.iter().any(|o| !o.diagnostics.is_empty());

    match output {
        OutputFormat::Text => {
            for (unit, outcome) in set.units().iter().zip(&outcomes) {
                if !outcome.diagnostics.is_empty() {
                    print!("{}", diag::render(&outcome.diagnostics, &unit.text));
                }
                if outcome.unrecoverable {
                    eprintln!("{}: unrecoverable", unit.name);
                }
            }
        }
        OutputFormat::Json => {
            let units: Vec<serde_json::Value> = outcomes
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "unit": o.module.unit,
                        "unrecoverable": o.unrecoverable,
                        "diagnostics": o
                            .diagnostics
                            .iter()
                            .map(|d| d.to_json_value())
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::Value::Array(units));
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

fn cmd_decls(files: &[PathBuf]) -> i32 {
    let set = match load(files) {
        Ok(set) => set,
        Err(code) => return code,
    };
    for outcome in parse_units(&set) {
        print!("{}", render_module(&outcome.module));
    }
    0
}
