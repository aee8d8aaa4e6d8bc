//! nomina CLI - Budget execution reports
//!
//! Downloads the execution sheet, classifies it into the payroll reports and
//! renders them as text, JSON, HTML or an Excel workbook.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use nomina_core::{ReportKind, Screen};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{OutputFormat, SourceOptions};
use config::Config;

#[derive(Parser)]
#[command(name = "nomina")]
#[command(
    author,
    version,
    about = "Budget execution reports for education payroll",
    long_about = None
)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./nomina.toml when present)
    #[arg(long, global = true, env = "NOMINA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
struct SourceArgs {
    /// CSV export URL
    #[arg(long, env = "NOMINA_SOURCE_URL")]
    url: Option<String>,

    /// Read a local CSV file instead of the URL
    #[arg(long, value_name = "CSV")]
    input: Option<PathBuf>,

    /// Bypass the snapshot cache
    #[arg(long)]
    refresh: bool,
}

impl From<SourceArgs> for SourceOptions {
    fn from(args: SourceArgs) -> Self {
        Self {
            url: args.url,
            input: args.input,
            refresh: args.refresh,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List report kinds and dashboard screens
    Reports,

    /// Generate one or more reports
    Report {
        /// Report kinds (see `nomina reports`)
        #[arg(value_name = "KIND", required = true)]
        kinds: Vec<ReportKind>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Export reports to an Excel workbook
    Export {
        /// Report kinds (all recursos-propios reports if omitted)
        #[arg(value_name = "KIND")]
        kinds: Vec<ReportKind>,

        /// Output file (timestamped name in the current directory if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Render a dashboard screen as a standalone HTML page
    Dashboard {
        /// Screen to render
        #[arg(long, default_value = "por-fuente")]
        screen: Screen,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Reports => {
            print!("{}", commands::list());
        }
        Commands::Report {
            kinds,
            format,
            output,
            source,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            commands::report(&config, &source.into(), &kinds, format, output.as_deref())?;
        }
        Commands::Export {
            kinds,
            output,
            source,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let path = commands::export(&config, &source.into(), &kinds, output.as_deref())?;
            println!("Exported: {}", path.display());
        }
        Commands::Dashboard {
            screen,
            output,
            source,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            commands::dashboard(&config, &source.into(), screen, output.as_deref())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
