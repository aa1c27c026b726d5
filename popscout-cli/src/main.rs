use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use popscout::{
    config::{CliOverrides, ScoutConfig},
    index_of, load_countries,
    population::{CountryDataset, CountryTable, HttpPopulationSource},
    LabelStore, ScoutResult,
};
use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliCountriesConfig {
    /// Only show countries whose name contains this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    query: String,

    /// Table order as key:dir (country|population, asc|desc)
    #[arg(short, long)]
    sort: Option<String>,

    /// Number of rows to show
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Population requests in flight at once
    #[arg(short = 'j', long)]
    concurrency: Option<NonZeroUsize>,

    /// Root URL of the population service
    #[arg(long)]
    base_url: Option<String>,

    /// Configuration file to layer on top of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a list of labels, optionally adding and removing entries first
    Labels {
        /// Label to start with (can be specified multiple times)
        #[arg(short, long = "item")]
        items: Vec<String>,

        /// Label to append after the initial ones
        #[arg(short, long)]
        add: Vec<String>,

        /// Label to remove, matched case-insensitively
        #[arg(short, long)]
        remove: Vec<String>,

        /// Only show labels containing this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Start from an empty list instead of the built-in currencies
        #[arg(long)]
        no_seed: bool,
    },

    /// Print where a pattern first occurs in a text, ignoring case
    Find {
        /// Text to search in
        text: String,

        /// Pattern to search for
        pattern: String,
    },

    /// Load today's population of every country and show the top rows
    Countries(Box<CliCountriesConfig>),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    run().await
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Labels {
            items,
            add,
            remove,
            query,
            no_seed,
        } => {
            init_logging(None);
            let mut store = if no_seed {
                LabelStore::new()
            } else {
                LabelStore::with_seed()
            };
            for item in items.iter().chain(add.iter()) {
                store.add(item);
            }
            for label in &remove {
                if !store.remove(label) {
                    eprintln!("{}", format!("No label matching '{}'", label).yellow());
                }
            }
            print_labels(&store.search(&query), store.len(), &query);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Find { text, pattern } => {
            init_logging(None);
            match index_of(&text, &pattern) {
                Some(index) => println!("{}", index.to_string().green()),
                None => println!("{}", "not found".yellow()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Countries(args) => run_countries(*args).await,
    }
}

async fn run_countries(args: CliCountriesConfig) -> Result<ExitCode> {
    let overrides = CliOverrides {
        base_url: args.base_url,
        concurrency: args.concurrency,
        top_n: args.limit,
        sort: args.sort,
        log_level: args.log_level,
    };
    let config = ScoutConfig::load_from(args.config.as_deref())
        .context("Failed to load configuration")?
        .merge_with_cli(overrides);
    init_logging(Some(&config.log_level));
    let order = config.sort_order()?;
    debug!("Using {:?}", config);

    match fetch(&config).await {
        Ok(dataset) => {
            let table = CountryTable::render(&dataset, &args.query, order, config.top_n);
            print_table(&table);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let table = CountryTable::failed(&err);
            eprintln!("{}", table.status.red());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn fetch(config: &ScoutConfig) -> ScoutResult<CountryDataset> {
    let source = HttpPopulationSource::from_config(config)?;
    load_countries(&source, config).await
}

/// Logs go to stderr; `RUST_LOG` wins over the configured level.
fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_labels(labels: &[String], total: usize, query: &str) {
    for label in labels {
        println!("{}", label);
    }
    let filtered = if query.trim().is_empty() {
        ""
    } else {
        " (filtered)"
    };
    println!(
        "\nShowing {} of {} labels{}.",
        labels.len(),
        total,
        filtered
    );
}

fn print_table(table: &CountryTable) {
    let width = table
        .rows
        .iter()
        .map(|row| row.country.chars().count())
        .max()
        .unwrap_or(0);

    for row in &table.rows {
        let rank = format!("{:>3}.", row.rank);
        let name = format!("{:<width$}", row.country, width = width);
        match &row.error {
            Some(error) => println!(
                "{} {}  {}  {}",
                rank.green(),
                name,
                row.population_display(),
                error.red()
            ),
            None => println!(
                "{} {}  {}",
                rank.green(),
                name.blue(),
                row.population_display()
            ),
        }
    }

    println!("\n{}", table.status);
}
