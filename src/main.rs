//! `wdsig` command line: reconcile a saved SPARQL results file and print the
//! summary, the lint lines or the reconciled records.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wdsig::{Assembler, BuiltinConverter, Options};

#[derive(Parser)]
#[command(name = "wdsig", about = "Reconcile Wikidata file-format signatures and lint the source records")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// JSON file overriding relativity sentinels and other conventions
    #[arg(long)]
    options: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print run summary counts as JSON
    Summary {
        /// SPARQL JSON results document
        input: PathBuf,
        /// Include every lint message in the summary
        #[arg(long)]
        lint: bool,
    },
    /// Print one line per lint found
    Lint {
        input: PathBuf,
    },
    /// Print reconciled records as JSON
    Records {
        input: PathBuf,
        /// Only print the record with this identifier, e.g. Q26303
        #[arg(long)]
        id: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let options = match &cli.options {
        Some(path) => Options::from_path(path)?,
        None       => Options::default(),
    };

    match cli.command {

        // ── Summary ──────────────────────────────────────────────────────────
        Commands::Summary { input, lint } => {
            let asm = reconcile(&input, options)?;
            println!("{}", serde_json::to_string_pretty(&asm.summary(lint))?);
        }

        // ── Lint ─────────────────────────────────────────────────────────────
        Commands::Lint { input } => {
            let asm = reconcile(&input, options)?;
            let mut lines = asm.linter().render();
            lines.sort();
            for line in lines {
                println!("{line}");
            }
        }

        // ── Records ──────────────────────────────────────────────────────────
        Commands::Records { input, id } => {
            let asm = reconcile(&input, options)?;
            match id {
                Some(id) => match asm.record(&id) {
                    Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                    None => return Err(format!("No record with identifier '{id}'").into()),
                },
                None => println!("{}", serde_json::to_string_pretty(asm.records())?),
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn reconcile(input: &PathBuf, options: Options) -> Result<Assembler<BuiltinConverter>, Box<dyn std::error::Error>> {
    let rows = wdsig::sparql::rows_from_path(input)?;
    let mut asm = Assembler::new(options, BuiltinConverter);
    asm.run(&rows);
    Ok(asm)
}
