mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::valuation::{NormalizeArgs, ValidateArgs, ValueArgs};

/// Peer-multiple equity valuation
#[derive(Parser)]
#[command(
    name = "pval",
    version,
    about = "Peer-multiple equity valuation",
    long_about = "Values a company per share from EV/Revenue, EV/EBITDA and P/E \
                  peer multiples with decimal precision, and reconciles the three \
                  prices into a summary range."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for diagnostics on stderr (RUST_LOG overrides)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a company from its figures and a peer multiple table
    Value(ValueArgs),
    /// Check inputs without valuing; prints errors with suggested fixes
    Validate(ValidateArgs),
    /// Convert a reported figure into base units
    Normalize(NormalizeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// A command's printable output and the process exit code it implies.
pub struct Reply {
    pub value: serde_json::Value,
    pub exit_code: i32,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let result: Result<Reply, Box<dyn std::error::Error>> = match cli.command {
        Commands::Value(args) => commands::valuation::run_value(args),
        Commands::Validate(args) => commands::valuation::run_validate(args),
        Commands::Normalize(args) => commands::valuation::run_normalize(args),
        Commands::Version => {
            println!("pval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(reply) => {
            output::format_output(&cli.output, &reply.value);
            if reply.exit_code != 0 {
                eprintln!("{}: inputs failed validation", "invalid".yellow().bold());
            }
            process::exit(reply.exit_code);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
