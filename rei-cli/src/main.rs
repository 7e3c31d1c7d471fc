#![warn(clippy::all)]
#![allow(clippy::pedantic)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rei_common::config::Config;
use rei_common::logging::{init_cli_logging, init_logging};

mod deal;
mod loan;

/// `rei` - Rental property and BRRRR deal calculator.
#[derive(Parser, Debug)]
#[command(name = "rei")]
#[command(version)]
#[command(about = "Analyze rental property deals, size loans and refinances.", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for `rei analyze`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Headline numbers
    Text,
    /// Full analysis as JSON
    Json,
    /// Printable markdown report
    Markdown,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a deal document (.md or .json)
    Analyze {
        /// Deal document
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Monthly payment and amortization for a fixed-rate loan
    Mortgage {
        /// Loan principal
        #[arg(long)]
        principal: f64,

        /// Annual interest rate (%)
        #[arg(long)]
        rate: f64,

        /// Term in years
        #[arg(long, default_value = "30")]
        years: u32,

        /// Print the yearly amortization schedule
        #[arg(long)]
        schedule: bool,
    },

    /// Size a cash-out refinance
    Refinance {
        /// Appraised property value
        #[arg(long)]
        value: f64,

        /// Loan-to-value (%)
        #[arg(long, default_value = "75")]
        ltv: f64,

        /// Existing loan balance to pay off
        #[arg(long, default_value = "0")]
        balance: f64,

        /// New loan rate (%)
        #[arg(long)]
        rate: f64,

        /// New loan term in years
        #[arg(long, default_value = "30")]
        years: u32,

        /// Closing costs on the new loan
        #[arg(long, default_value = "0")]
        closing_costs: f64,
    },

    /// Write a blank deal document pre-filled with configured defaults
    Template {
        /// Output path (default: <deals_dir>/new-deal.md)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Convert a deal between markdown and JSON (by file extension)
    Convert {
        /// Source document
        input: PathBuf,
        /// Destination document
        output: PathBuf,
    },

    /// Run the calculator HTTP service
    Serve {
        /// Host to bind to (default: network.bind)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default: services.calculator.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_and_validate()?;

    // The service logs like a service; everything else keeps stdout clean.
    if !matches!(cli.command, Commands::Serve { .. }) {
        init_cli_logging(if cli.verbose { "debug" } else { "warn" });
    }

    run(cli.command, config, cli.verbose).await
}

/// Run the HTTP service in-process with service-style logging.
async fn serve(mut config: Config, host: Option<String>, port: Option<u16>, verbose: bool) -> Result<()> {
    if let Some(host) = host {
        config.network.bind = host;
    }
    if port.is_some() {
        config.services.calculator.port = port;
    }

    let level = if verbose {
        "debug".to_string()
    } else {
        config.observability.log_level.clone()
    };
    init_logging(&level, &config.observability.log_format);
    tracing::info!("REI Calc v{}", env!("CARGO_PKG_VERSION"));

    rei_calc::CalculatorService::new(config).start().await
}

async fn run(command: Commands, config: Config, verbose: bool) -> Result<()> {
    match command {
        Commands::Serve { host, port } => return serve(config, host, port, verbose).await,
        Commands::Analyze { file, format } => deal::analyze(&config, &file, format)?,
        Commands::Mortgage {
            principal,
            rate,
            years,
            schedule,
        } => loan::mortgage(principal, rate, years, schedule)?,
        Commands::Refinance {
            value,
            ltv,
            balance,
            rate,
            years,
            closing_costs,
        } => loan::refinance(value, ltv, balance, rate, years, closing_costs)?,
        Commands::Template { out, force } => {
            let path = deal::template(&config, out, force)?;
            println!("Wrote {}", path.display());
        }
        Commands::Convert { input, output } => {
            deal::convert(&input, &output)?;
            println!("Converted {} -> {}", input.display(), output.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["rei", "analyze", "deal.md", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Analyze { file, format } => {
                assert_eq!(file, PathBuf::from("deal.md"));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_mortgage_defaults() {
        let cli =
            Cli::try_parse_from(["rei", "mortgage", "--principal", "250000", "--rate", "6.5"])
                .unwrap();
        match cli.command {
            Commands::Mortgage { years, schedule, .. } => {
                assert_eq!(years, 30);
                assert!(!schedule);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["rei", "-v", "serve", "--port", "5000"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: Some(5000)
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["rei", "analyze", "deal.md", "--format", "pdf"]).is_err());
    }
}
