//! cryptonotify
//!
//! Polls conversion rates for the configured jobs and emails an alert when
//! a monitored target is reached. One invocation is one pass; run it from
//! cron or a systemd timer.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use tracing::{info, warn};

use cryptonotify::catalog::{CatalogStore, UNRESOLVED_ID};
use cryptonotify::config::{self, ConfigDocument, ConfigStore, JobSpec, JobUpdate};
use cryptonotify::error::NotifyError;
use cryptonotify::jobs::{JobContext, JobLedger, PassRunner};
use cryptonotify::logging;
use cryptonotify::models::Comparison;
use cryptonotify::services::coinmarketcap::CmcRateSource;
use cryptonotify::services::mailer::Dispatcher;

#[derive(Parser)]
#[command(name = "cryptonotify", about = "Crypto rate email alerts", version)]
struct Cli {
    /// Path to the configuration document
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one notification pass over the configured jobs
    Run,
    /// Validate the configuration and symbol resolution without fetching rates
    Check,
    /// Manage the configured jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Manage the cached symbol catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Subcommand)]
enum JobsCommand {
    /// List the configured jobs and their notification counts
    List,
    /// Append a job to the configuration
    Add {
        /// Recipient address for the alert
        #[arg(long)]
        email: String,
        /// Monitored coin symbol
        #[arg(long)]
        source: String,
        /// Conversion target symbol
        #[arg(long)]
        target: String,
        /// Amount of the source coin to convert
        #[arg(long)]
        source_value: Decimal,
        /// Target rate that triggers the alert
        #[arg(long)]
        target_value: Decimal,
        /// Comparison operator: >, < or =
        #[arg(long)]
        comparison: String,
    },
    /// Edit fields of a job in place
    Edit {
        /// Index of the job to edit
        index: usize,
        /// Recipient address for the alert
        #[arg(long)]
        email: Option<String>,
        /// Monitored coin symbol
        #[arg(long)]
        source: Option<String>,
        /// Conversion target symbol
        #[arg(long)]
        target: Option<String>,
        /// Amount of the source coin to convert
        #[arg(long)]
        source_value: Option<Decimal>,
        /// Target rate that triggers the alert
        #[arg(long)]
        target_value: Option<Decimal>,
        /// Comparison operator: >, < or =
        #[arg(long)]
        comparison: Option<String>,
        /// Overwrite the notification count, e.g. to re-arm a fired alert
        #[arg(long)]
        notified: Option<u64>,
    },
    /// Remove a job by its index
    Remove { index: usize },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Fetch a fresh symbol snapshot and overwrite the cached catalog
    Refresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let store = ConfigStore::new(&config_path);

    // Configuration first: the syslog flag decides where logs go.
    let doc = store.load().map_err(|e| e.to_string())?;
    logging::init_logging(doc.servers.syslog).map_err(|e| e.to_string())?;

    let env = config::get_environment();
    info!("Starting cryptonotify");
    info!(environment = %env, "Environment");
    info!(
        config = %config_path.display(),
        jobs = doc.jobs.len(),
        "Configuration loaded from {} with {} jobs",
        config_path.display(),
        doc.jobs.len()
    );

    let result = match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_pass(store, doc).await,
        Command::Check => check(doc).await,
        Command::Jobs { command } => manage_jobs(store, doc, command),
        Command::Catalog { command } => manage_catalog(doc, command).await,
    };

    result.map_err(|e| e.to_string())?;
    Ok(())
}

async fn run_pass(store: ConfigStore, doc: ConfigDocument) -> Result<(), NotifyError> {
    let source = Arc::new(CmcRateSource::new(&doc.servers.endpoint));
    let catalog_store = CatalogStore::new(config::default_catalog_path());
    let catalog = catalog_store.load_or_fetch(source.as_ref()).await?;

    let dispatcher = Dispatcher::from_policy(&doc.servers.email)?;
    if !dispatcher.is_enabled() {
        warn!("Email dispatch disabled, alerts will be evaluated but not delivered");
    }

    let ledger = JobLedger::new(doc, store);
    let ctx = JobContext::new(source, dispatcher);
    let mut runner = PassRunner::new(ctx, catalog, ledger);
    runner.run_pass().await;
    Ok(())
}

/// Resolve every job against the catalog and parse every operator, without
/// touching the exchange endpoint.
async fn check(doc: ConfigDocument) -> Result<(), NotifyError> {
    let source = CmcRateSource::new(&doc.servers.endpoint);
    let catalog_store = CatalogStore::new(config::default_catalog_path());
    let catalog = catalog_store.load_or_fetch(&source).await?;

    let mut problems = 0usize;
    for (index, job) in doc.jobs.iter().enumerate() {
        for symbol in [&job.source_coin, &job.target_coin] {
            if catalog.resolve(symbol) == UNRESOLVED_ID {
                warn!(
                    job = index,
                    symbol = %symbol,
                    "Job #{}: symbol {} is not in the catalog",
                    index,
                    symbol
                );
                problems += 1;
            }
        }
        if Comparison::from_str(job.comparison.trim()).is_err() {
            warn!(
                job = index,
                comparison = %job.comparison,
                "Job #{}: invalid comparison operator {:?}",
                index,
                job.comparison
            );
            problems += 1;
        }
    }

    if problems == 0 {
        info!(
            jobs = doc.jobs.len(),
            "Configuration OK, {} jobs ready",
            doc.jobs.len()
        );
        Ok(())
    } else {
        Err(NotifyError::configuration(format!(
            "{} problem(s) found, see warnings above",
            problems
        )))
    }
}

fn manage_jobs(
    store: ConfigStore,
    mut doc: ConfigDocument,
    command: JobsCommand,
) -> Result<(), NotifyError> {
    match command {
        JobsCommand::List => {
            if doc.jobs.is_empty() {
                println!("no jobs configured");
                return Ok(());
            }
            for (index, job) in doc.jobs.iter().enumerate() {
                println!(
                    "#{} {} {} {} {} {} -> {} (notified {})",
                    index,
                    job.source_value,
                    job.source_coin,
                    job.comparison,
                    job.target_value,
                    job.target_coin,
                    job.email,
                    job.notified_count
                );
            }
            Ok(())
        }
        JobsCommand::Add {
            email,
            source,
            target,
            source_value,
            target_value,
            comparison,
        } => {
            let comparison = comparison.trim().to_string();
            Comparison::from_str(&comparison)?;
            doc.jobs.push(JobSpec {
                email,
                source_coin: source,
                target_coin: target,
                source_value,
                target_value,
                comparison,
                notified_count: 0,
            });
            store.save(&doc)?;
            println!("added job #{}", doc.jobs.len() - 1);
            Ok(())
        }
        JobsCommand::Edit {
            index,
            email,
            source,
            target,
            source_value,
            target_value,
            comparison,
            notified,
        } => {
            if index >= doc.jobs.len() {
                return Err(NotifyError::configuration(format!(
                    "job index {} out of range, {} jobs configured",
                    index,
                    doc.jobs.len()
                )));
            }
            let comparison = match comparison {
                Some(raw) => {
                    let trimmed = raw.trim().to_string();
                    Comparison::from_str(&trimmed)?;
                    Some(trimmed)
                }
                None => None,
            };
            doc.jobs[index].apply(JobUpdate {
                email,
                source_coin: source,
                target_coin: target,
                source_value,
                target_value,
                comparison,
                notified_count: notified,
            });
            store.save(&doc)?;
            let job = &doc.jobs[index];
            println!(
                "edited job #{} {} {} {} {} {} -> {} (notified {})",
                index,
                job.source_value,
                job.source_coin,
                job.comparison,
                job.target_value,
                job.target_coin,
                job.email,
                job.notified_count
            );
            Ok(())
        }
        JobsCommand::Remove { index } => {
            if index >= doc.jobs.len() {
                return Err(NotifyError::configuration(format!(
                    "job index {} out of range, {} jobs configured",
                    index,
                    doc.jobs.len()
                )));
            }
            let removed = doc.jobs.remove(index);
            store.save(&doc)?;
            println!(
                "removed job #{} ({} {} {})",
                index, removed.source_coin, removed.comparison, removed.target_coin
            );
            Ok(())
        }
    }
}

async fn manage_catalog(doc: ConfigDocument, command: CatalogCommand) -> Result<(), NotifyError> {
    match command {
        CatalogCommand::Refresh => {
            let source = CmcRateSource::new(&doc.servers.endpoint);
            let catalog_store = CatalogStore::new(config::default_catalog_path());
            catalog_store.refresh(&source).await?;
            let catalog = catalog_store.load_or_fetch(&source).await?;
            println!("catalog refreshed: {} symbols", catalog.len());
            Ok(())
        }
    }
}
