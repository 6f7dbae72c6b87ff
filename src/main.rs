//! # Catalog CLI Application
//!
//! Command-line entry point for the catalog aggregator.
//!
//! - `run`: Resolve leaf categories and build a catalog for each of them
//! - `leaves`: Print the leaf categories under a root code
//! - `list`: Show the catalogs stored in the database
//!
//! API keys are read from the environment (a `.env` file is honoured).

mod telemetry;

use anyhow::Context;
use catalog::aggregator::{AggregatorConfig, CatalogAggregator, CategoryOutcome, ProgressEvent};
use catalog::crawler::{FetchConfig, SpiderFetcher};
use catalog::extract::{
    AgentConfig, CatalogAgent, CatalogPipeline, ExtractionStrategy, PipelineConfig,
};
use catalog::model::{GeminiClient, DEFAULT_MODEL};
use catalog::schema::{DeriveAndStore, SchemaDeriver};
use catalog::search::TavilyClient;
use catalog::store::Database;
use catalog::taxonomy::{
    save_entries, ClassificationEntry, DuplicateCodePolicy, EntrySource, FileEntrySource,
    LeafResolver, TaxonomyError, UngmEntrySource,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use telemetry::OtelGuard;
use tokio::sync::mpsc;
use tracing::instrument;

/// Root of the building and construction machinery segment
const DEFAULT_ROOT_CODE: &str = "22000000";

#[derive(Parser)]
#[command(author, version, about = "Aggregates building-material product catalogs from UNSPSC categories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build catalogs for every leaf category under a root code
    Run(RunArgs),

    /// Print the leaf categories under a root code
    Leaves(LeavesArgs),

    /// List stored catalogs
    List(ListArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Root UNSPSC code
    #[arg(short, long, default_value = DEFAULT_ROOT_CODE)]
    code: String,

    /// Use the tool-calling agent instead of the direct pipeline
    #[arg(short, long)]
    agentic: bool,

    /// Read classification entries from a cached file instead of UNGM
    #[arg(short, long)]
    entries: Option<PathBuf>,

    /// Fail when several entries share the root code instead of using the first
    #[arg(long)]
    strict_codes: bool,

    /// Pause between categories in milliseconds
    #[arg(long, default_value = "5000")]
    delay_ms: u64,

    /// Give up on a category after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Database path
    #[arg(long, default_value = "catalog.db")]
    database: PathBuf,

    /// LLM model for extraction and schema inference
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,
}

#[derive(Args, Debug)]
struct LeavesArgs {
    /// Root UNSPSC code
    #[arg(short, long, default_value = DEFAULT_ROOT_CODE)]
    code: String,

    /// Read classification entries from a cached file instead of UNGM
    #[arg(short, long)]
    entries: Option<PathBuf>,

    /// Save the fetched entries for later runs
    #[arg(short, long)]
    save_entries: Option<PathBuf>,

    /// Fail when several entries share the root code instead of using the first
    #[arg(long)]
    strict_codes: bool,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Show detailed information
    #[arg(short, long)]
    details: bool,

    /// Database path
    #[arg(long, default_value = "catalog.db")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let cli = Cli::parse();

    let _otel: OtelGuard = telemetry::init_tracing_subscriber();

    match cli.command {
        Some(Commands::Run(args)) => {
            run_command(args).await?;
        }
        Some(Commands::Leaves(args)) => {
            leaves_command(args).await?;
        }
        Some(Commands::List(args)) => {
            list_command(args).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["catalog", "--help"]);
        }
    }

    Ok(())
}

/// Where the classification entries come from
enum CliEntrySource {
    File(FileEntrySource),
    Ungm(UngmEntrySource),
}

impl CliEntrySource {
    fn new(entries: Option<&PathBuf>) -> Self {
        match entries {
            Some(path) => Self::File(FileEntrySource::new(path)),
            None => Self::Ungm(UngmEntrySource::new()),
        }
    }
}

impl EntrySource for CliEntrySource {
    async fn fetch_all_entries(&self) -> Result<Vec<ClassificationEntry>, TaxonomyError> {
        match self {
            Self::File(source) => source.fetch_all_entries().await,
            Self::Ungm(source) => source.fetch_all_entries().await,
        }
    }
}

fn leaf_resolver(strict_codes: bool) -> LeafResolver {
    if strict_codes {
        LeafResolver::new(DuplicateCodePolicy::Reject)
    } else {
        LeafResolver::default()
    }
}

#[instrument]
async fn run_command(args: RunArgs) -> anyhow::Result<()> {
    let client = GeminiClient::new_gemini_from_env(&args.model)?;
    let model = client.completion().clone();
    let search = TavilyClient::from_env()?;
    let fetcher = SpiderFetcher::new(FetchConfig::default());

    let strategy = if args.agentic {
        println!("Using agentic catalog search");
        ExtractionStrategy::Agentic(CatalogAgent::new(
            model.clone(),
            search,
            fetcher,
            AgentConfig::default(),
        ))
    } else {
        println!("Using catalog search pipeline");
        ExtractionStrategy::Pipeline(CatalogPipeline::new(
            search,
            fetcher,
            model.clone(),
            PipelineConfig::default(),
        ))
    };

    let db = Database::new_from_path(&args.database.to_string_lossy()).await?;
    let deriver = DeriveAndStore::new(SchemaDeriver::new(model), db);
    let config = AggregatorConfig::builder()
        .delay_ms(args.delay_ms)
        .category_timeout_secs(args.timeout_secs)
        .build();
    let aggregator = CatalogAggregator::new(strategy, deriver, config);

    let source = CliEntrySource::new(args.entries.as_ref());

    let (progress_sender, mut progress_receiver) = mpsc::channel(100);

    // Length is known once the first category starts
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );

    // Spawn a task to process progress updates
    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(event) = progress_receiver.recv().await {
                match event {
                    ProgressEvent::Started {
                        total, category, ..
                    } => {
                        progress_bar.set_length(total as u64);
                        progress_bar.set_message(category);
                    }
                    ProgressEvent::Finished {
                        category, outcome, ..
                    } => {
                        progress_bar.inc(1);
                        match outcome {
                            CategoryOutcome::Stored(stored) => progress_bar.println(format!(
                                "Stored {} products for {}",
                                stored.products.len(),
                                category
                            )),
                            CategoryOutcome::Empty => {
                                progress_bar.println(format!("No listings for {}", category))
                            }
                            CategoryOutcome::Failed(reason) => progress_bar
                                .println(format!("Failed {}: {}", category, reason)),
                            CategoryOutcome::TimedOut => {
                                progress_bar.println(format!("Timed out on {}", category))
                            }
                        }
                    }
                }
            }
            progress_bar.finish_with_message("Done");
        }
    });

    let result = aggregator
        .run_from_source(
            &source,
            &args.code,
            leaf_resolver(args.strict_codes),
            Some(progress_sender),
        )
        .await;

    // Wait for progress task to complete (it will end when all senders are dropped)
    let _ = progress_handle.await;

    let summary = result
        .with_context(|| format!("Failed to resolve leaf categories under {}", args.code))?;

    println!(
        "Processed {} categories: {} stored, {} empty, {} failed, {} timed out",
        summary.leaves, summary.stored, summary.empty, summary.failed, summary.timed_out
    );

    Ok(())
}

#[instrument]
async fn leaves_command(args: LeavesArgs) -> anyhow::Result<()> {
    let entries = CliEntrySource::new(args.entries.as_ref())
        .fetch_all_entries()
        .await
        .context("Failed to load UNSPSC entries")?;

    if let Some(path) = &args.save_entries {
        save_entries(path, &entries).await?;
        eprintln!("Saved {} entries to {}", entries.len(), path.display());
    }

    let leaves = leaf_resolver(args.strict_codes).resolve(&entries, &args.code)?;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&leaves)?);
        }
        _ => {
            println!("Leaf categories under {}: {}", args.code, leaves.len());
            for leaf in &leaves {
                println!("{}  {}", leaf.code, leaf.title);
            }
        }
    }

    Ok(())
}

#[instrument]
async fn list_command(args: ListArgs) -> anyhow::Result<()> {
    let db = Database::new_from_path(&args.database.to_string_lossy()).await?;

    let catalogs = db.list_catalogs().await?;

    println!("Stored catalogs: {}", catalogs.len());

    let format_timestamp = |ts: i64| -> String {
        use chrono::{DateTime, TimeZone, Utc};
        match Utc.timestamp_opt(ts, 0).single() {
            Some(dt) => {
                let dt: DateTime<Utc> = dt;
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            }
            None => ts.to_string(),
        }
    };

    for catalog in catalogs {
        if args.details {
            println!("Category: {}", catalog.category);
            println!("Schema: {}", catalog.schema.join(", "));
            println!("Products: {}", catalog.products.len());
            println!("Saved: {}", format_timestamp(catalog.created_at));
            for product in &catalog.products {
                println!("  {}", serde_json::Value::Object(product.clone()));
            }
            println!();
        } else {
            println!(
                "{} - {} products (Saved: {})",
                catalog.category,
                catalog.products.len(),
                format_timestamp(catalog.created_at)
            );
        }
    }

    Ok(())
}
