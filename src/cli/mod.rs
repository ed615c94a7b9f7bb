//! CLI command definitions and handlers

pub(crate) mod analyze;
mod init;
mod serve;
mod watch;

use crate::models::Category;
use crate::reporters::OutputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// funcloc - function size at a glance
///
/// Counts the lines of code inside every function body and sorts each
/// function into a low, medium or high tier.
#[derive(Parser, Debug)]
#[command(name = "funcloc")]
#[command(
    version,
    about = "Measure function bodies in lines of code and flag the long ones",
    after_help = "\
Tiers: up to 35 LOC is low, 36-60 medium, above 60 high.

Examples:
  funcloc analyze src/                     Measure every supported file under src/
  funcloc analyze main.py --format json    JSON output for scripting
  funcloc analyze lib.rs --min-category high
  funcloc watch .                          Re-measure files as they are saved
  funcloc serve                            Language server on stdio"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the language server on stdio
    Serve,

    /// Measure functions in files or directories
    #[command(after_help = "\
Supported languages: Rust, Python, JavaScript, TypeScript, Go, Java, C, C++, C#

With --symbols, the symbol tree is read from a textDocument/documentSymbol
response saved by another language server instead of parsing the file.")]
    Analyze {
        /// Files or directories to analyze
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text")]
        format: OutputFormat,

        /// DocumentSymbol JSON to use instead of the built-in parsers (single file only)
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Only report functions at or above this tier (low, medium, high)
        #[arg(long, default_value = "low")]
        min_category: Category,
    },

    /// Watch a directory and report function size changes on save
    Watch {
        /// Directory to watch
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Write an example funcloc.toml
    Init {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing funcloc.toml
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve => serve::run(),
        Commands::Analyze {
            paths,
            format,
            symbols,
            min_category,
        } => analyze::run(&paths, format, symbols.as_deref(), min_category),
        Commands::Watch { path } => watch::run(&path),
        Commands::Init { path, force } => init::run(&path, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["funcloc", "analyze"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Commands::Analyze {
                paths,
                format,
                symbols,
                min_category,
            } => {
                assert_eq!(paths, vec![PathBuf::from(".")]);
                assert_eq!(format, OutputFormat::Text);
                assert!(symbols.is_none());
                assert_eq!(min_category, Category::Low);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "funcloc",
            "--log-level",
            "debug",
            "analyze",
            "a.rs",
            "b.py",
            "-f",
            "json",
            "--min-category",
            "HIGH",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        let Commands::Analyze {
            paths,
            format,
            min_category,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(paths.len(), 2);
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(min_category, Category::High);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["funcloc", "analyze", "--format", "html"]).is_err());
        assert!(Cli::try_parse_from(["funcloc", "analyze", "--min-category", "huge"]).is_err());
        assert!(Cli::try_parse_from(["funcloc", "--log-level", "loud", "serve"]).is_err());
        assert!(Cli::try_parse_from(["funcloc"]).is_err());
    }
}
