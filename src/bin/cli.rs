//! Budget Finder CLI
//!
//! Searches for budget spending PDFs per fiscal year and saves the links.

use std::path::PathBuf;

use budget_finder::{
    error::{AppError, Result},
    models::{Config, OutputFormat},
    pipeline::DiscoveryPipeline,
    services::QueryBuilder,
    storage::{LocalStorage, ResultStorage},
    utils::console,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Budget Finder - fiscal-year budget PDF discovery
#[derive(Parser, Debug)]
#[command(
    name = "budget-finder",
    version,
    about = "Finds budget spending PDFs for fiscal years via web search"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "budget-finder.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Fiscal-year selection shared by subcommands.
#[derive(Args, Debug)]
struct Selection {
    /// Fiscal-year label to search (repeatable; defaults to config)
    #[arg(short, long = "year", value_name = "LABEL")]
    years: Vec<String>,

    /// Query text used verbatim instead of the built-in template
    #[arg(short, long)]
    query: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search, scan, and save document links
    Search {
        #[command(flatten)]
        selection: Selection,

        /// Maximum search results per fiscal year
        #[arg(long)]
        max_results: Option<usize>,

        /// Results file (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Results file format
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Print results without writing the results file
        #[arg(long)]
        no_save: bool,
    },

    /// Print the queries that would be sent, without searching
    Queries {
        #[command(flatten)]
        selection: Selection,
    },

    /// Validate configuration file
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Apply command-line fiscal-year selection on top of the config.
fn apply_selection(config: &mut Config, selection: Selection) {
    if !selection.years.is_empty() {
        config.discovery.fiscal_years = selection.years;
    }
    if selection.query.is_some() {
        config.discovery.query_override = selection.query;
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);
    config.output.verbose |= cli.verbose;
    init_logging(cli.verbose, &config.logging.level);

    match cli.command {
        Command::Search {
            selection,
            max_results,
            output,
            format,
            no_save,
        } => {
            apply_selection(&mut config, selection);
            if let Some(max) = max_results {
                config.search.max_results = max;
            }
            if let Some(path) = output {
                config.output.path = path;
            }
            if let Some(format) = format {
                config.output.format = format.into();
            }
            config.validate()?;

            log::info!(
                "Searching {} fiscal years: {}",
                config.discovery.fiscal_years.len(),
                config.discovery.fiscal_years.join(", ")
            );

            let pipeline = DiscoveryPipeline::from_config(&config)?;
            let shutdown = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let results = pipeline
                .run_until(&config.discovery.fiscal_years, shutdown)
                .await;

            console::print_report(&results, config.output.verbose);

            if results.cancelled && results.is_empty() {
                return Err(AppError::Cancelled);
            }

            if !no_save && !results.is_empty() {
                let storage = LocalStorage::new(&config.output.path, config.output.format);
                let meta = storage.write_results(&results).await?;
                println!(
                    "\nSearch complete! {} PDF links saved in '{}'",
                    meta.document_count,
                    meta.location.display()
                );
            }

            if results.all_failed() {
                return Err(AppError::search_unavailable(
                    config.discovery.fiscal_years.join(", "),
                    "every fiscal year failed",
                ));
            }
        }

        Command::Queries { selection } => {
            apply_selection(&mut config, selection);
            let builder = QueryBuilder::from_config(&config.discovery);
            for year in &config.discovery.fiscal_years {
                let query = builder.build(year, config.discovery.query_override.as_deref())?;
                println!("{query}");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} fiscal years, {} max results, {} suffix)",
                config.discovery.fiscal_years.len(),
                config.search.max_results,
                config.discovery.document_suffix
            );
        }
    }

    Ok(())
}
