use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use realprice::cli::adjust::AdjustOptions;
use realprice::cli::rate::RateOptions;
use realprice::core::log::init_logging;
use realprice::{AppCommand, TableSource};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct TableArgs {
    /// CSV file with date,index rows to use instead of a remote series
    #[arg(long)]
    table: Option<PathBuf>,

    /// Series to fetch instead of the configured one
    #[arg(long)]
    series: Option<String>,
}

impl From<TableArgs> for TableSource {
    fn from(args: TableArgs) -> TableSource {
        TableSource {
            table_path: args.table,
            series_id: args.series,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert prices from one date to another
    Adjust {
        #[command(flatten)]
        table: TableArgs,

        /// Date(s) the prices were observed on (YYYY-MM-DD), defaults to today
        #[arg(long, value_delimiter = ',')]
        from: Vec<NaiveDate>,

        /// Date(s) to convert the prices to (YYYY-MM-DD), defaults to today
        #[arg(long, value_delimiter = ',')]
        to: Vec<NaiveDate>,

        /// Price(s) to convert
        #[arg(long = "price", value_delimiter = ',', allow_negative_numbers = true)]
        prices: Vec<f64>,

        /// CSV file holding rows of prices, one row per date
        #[arg(long)]
        price_grid: Option<PathBuf>,

        /// Annual growth rate used outside the table's range
        #[arg(long, allow_negative_numbers = true)]
        growth_rate: Option<f64>,
    },
    /// Display the implied annual inflation between two dates
    Rate {
        #[command(flatten)]
        table: TableArgs,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Annual growth rate used outside the table's range
        #[arg(long, allow_negative_numbers = true)]
        growth_rate: Option<f64>,
    },
    /// Fetch index series and display an overview
    Series {
        /// Series ids, defaults to the configured series
        series_ids: Vec<String>,

        /// Write the fetched series to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ignore cached copies and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Remove all cached series
    ClearCache,
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Adjust {
                table,
                from,
                to,
                prices,
                price_grid,
                growth_rate,
            } => AppCommand::Adjust(
                table.into(),
                AdjustOptions {
                    from,
                    to,
                    prices,
                    price_grid,
                    growth_rate,
                },
            ),
            Commands::Rate {
                table,
                from,
                to,
                growth_rate,
            } => AppCommand::Rate(
                table.into(),
                RateOptions {
                    from,
                    to,
                    growth_rate,
                },
            ),
            Commands::Series {
                series_ids,
                output,
                refresh,
            } => AppCommand::Series {
                series_ids,
                output,
                refresh,
            },
            Commands::ClearCache => AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => realprice::cli::setup::setup(),
        Some(cmd) => realprice::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
