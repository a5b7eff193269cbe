// src/main.rs
use clap::Parser;

use lcp_compare::compare::{format_version_timestamp, parse_version_timestamp, CompareMode, ComparisonResponse, VersionComparator};
use lcp_compare::config::EngineConfig;
use lcp_compare::report::{HtmlReportRenderer, OutputFormat, ReportRenderer};
use lcp_compare::source::{HttpVersionSource, LocalVersionStore, VersionSource};
use lcp_compare::storage::StorageManager;
use lcp_compare::toc::TableOfContents;
use lcp_compare::utils::{self, AppError};

/// Command Line Interface for comparing Life Care Plan report versions
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// Case identifier whose report versions are compared
    #[arg(short, long)]
    case_id: String,

    /// Local directory laid out as <store-dir>/<case-id>/Output/<version>.pdf
    #[arg(long, conflicts_with = "base_url")]
    store_dir: Option<String>,

    /// Base URL of an HTTP version store
    #[arg(long)]
    base_url: Option<String>,

    /// Version keys to compare (defaults to every report version of the case)
    #[arg(long = "version", value_name = "KEY")]
    versions: Vec<String>,

    /// Comparison mode: all (consecutive pairs) or selective (oldest vs newest)
    #[arg(short, long, default_value = "selective")]
    mode: CompareMode,

    /// Report format: html or json
    #[arg(short, long, default_value = "html")]
    format: String,

    /// Output directory for reports and JSON results
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// JSON file with a custom table of contents
    #[arg(long)]
    toc: Option<String>,

    /// Versions fetched and extracted at once (overrides LCP_MAX_CONCURRENCY)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-version extraction timeout in seconds (overrides LCP_EXTRACTION_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// List the case's report versions and exit
    #[arg(short, long)]
    list: bool,

    /// Debug logging for this crate
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);
    tracing::info!("Starting comparison for args: {:?}", args);

    // 2. Configuration: CLI args over environment over defaults
    let config = EngineConfig::from_env()?.with_overrides(args.concurrency, args.timeout_secs)?;
    let toc = match &args.toc {
        Some(path) => TableOfContents::from_json_file(path)?,
        None => TableOfContents::default(),
    };
    let format: OutputFormat = args.format.parse()?;
    tracing::debug!("Engine config: {:?}", config);

    // 3. Pick the version source
    match (&args.store_dir, &args.base_url) {
        (_, Some(url)) => run(HttpVersionSource::new(url)?, &args, config, toc, format).await,
        (Some(dir), None) => run(LocalVersionStore::new(dir), &args, config, toc, format).await,
        (None, None) => Err(AppError::Config("Either --store-dir or --base-url is required".to_string())),
    }
}

async fn run<S: VersionSource + 'static>(
    source: S,
    args: &Args,
    config: EngineConfig,
    toc: TableOfContents,
    format: OutputFormat,
) -> Result<(), AppError> {
    let comparator = VersionComparator::new(source, toc, config);

    // 4. Resolve which versions to compare
    let keys: Vec<String> = if args.versions.is_empty() || args.list {
        let versions = comparator.list_versions(&args.case_id).await?;
        if args.list {
            for version in &versions {
                let stamp = parse_version_timestamp(&version.filename)
                    .map(|ts| format_version_timestamp(&ts))
                    .unwrap_or_else(|| "undated".to_string());
                println!("{}  {:>10}  {}", stamp, version.size, version.key);
            }
            return Ok(());
        }
        versions.into_iter().map(|v| v.key).collect()
    } else {
        args.versions.clone()
    };

    // 5. Compare
    let response = comparator.compare_versions(&args.case_id, &keys, args.mode).await;
    let result = match response {
        ComparisonResponse::Completed(result) => result,
        ComparisonResponse::Failed { error } => {
            println!("{}", serde_json::json!({ "error": error }));
            return Err(AppError::Comparison(error));
        }
    };

    let summary = result.summary();
    tracing::info!(
        "Compared {} versions: {} sections ({} added, {} removed, {} modified, {} unchanged)",
        result.versions_compared.len(),
        summary.total,
        summary.added,
        summary.removed,
        summary.modified,
        summary.unchanged
    );

    // 6. Render and save
    let storage = StorageManager::new(&args.output_dir)?;
    let bytes = HtmlReportRenderer.render(&result, format)?;
    let report_path = storage.save_report(&result, format, &bytes)?;
    if format != OutputFormat::Json {
        storage.save_result(&result)?;
    }

    println!("{}", report_path.display());
    Ok(())
}
