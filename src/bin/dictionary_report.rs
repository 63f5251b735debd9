//! Dictionary Report Binary
//!
//! Prints diff, tree, coverage and validation reports for dictionaries stored
//! in a directory. Reports are written to stdout as JSON; logs go to stderr.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DICTIONARY_DIR`: Directory with `<version>.json` and `codelists.json` (default: ./dictionaries)
//! - `DICTIONARY_CACHE_SIZE`: Cap on cached versions (default: unbounded)
//! - `RUST_LOG`: Log level filter (default: dictionary_report=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! DICTIONARY_DIR=./dictionaries cargo run --bin dictionary_report --features cli -- diff 0.10a 0.10b
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dictionary_kernel::{
    build_forest, build_tree, checked_coverage, derive_parent_edges, partition_code_lists,
    report_fingerprint, unreachable, CacheConfig, DictionaryCache, DictionaryValidator,
    DiffEngine, FsDictionarySource, DEFAULT_ROOT, REPORT_SCHEMA_VERSION,
};

#[derive(Debug, Parser)]
#[command(
    name = "dictionary_report",
    about = "Diff, relation tree and code list reports for submission dictionaries",
    version
)]
struct Cli {
    /// Directory holding the dictionary files.
    #[arg(long, env = "DICTIONARY_DIR", default_value = "./dictionaries")]
    dir: PathBuf,
    /// Cap on cached versions.
    #[arg(long, env = "DICTIONARY_CACHE_SIZE")]
    cache_size: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Changes between two versions. Defaults to the latest two.
    Diff { from: Option<String>, to: Option<String> },
    /// Relation tree of one version.
    Tree {
        version: String,
        #[arg(default_value = DEFAULT_ROOT)]
        root: String,
        /// One tree per top-level file type instead of a single root.
        #[arg(long)]
        forest: bool,
    },
    /// File types using a code list, or every code list split by use.
    Coverage {
        version: String,
        codelist: Option<String>,
    },
    /// Constraint violations of one version.
    Validate { version: String },
    /// Published versions, newest first.
    Versions,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dictionary_report=info,dictionary_kernel=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let config = CacheConfig {
        max_entries: cli.cache_size,
    };
    let cache = DictionaryCache::with_config(FsDictionarySource::new(&cli.dir), config);

    match cli.command {
        Commands::Diff { from, to } => {
            let (from, to) = match (from, to) {
                (Some(from), Some(to)) => (from, to),
                (from, to) => {
                    let catalog = cache.catalog().await?;
                    let (default_from, default_to) = catalog
                        .default_pair()
                        .ok_or("no published dictionary versions")?;
                    (
                        from.unwrap_or_else(|| default_from.to_string()),
                        to.unwrap_or_else(|| default_to.to_string()),
                    )
                }
            };

            let (from_dict, to_dict) = cache.get_pair(&from, &to).await?;
            let report = DiffEngine::default().compute(&from_dict, &to_dict)?;
            info!(from = %from, to = %to, entries = report.len(), "diff computed");

            print_json(&serde_json::json!({
                "schemaVersion": REPORT_SCHEMA_VERSION,
                "from": from,
                "to": to,
                "fingerprint": report_fingerprint(&report),
                "summary": report.summary(),
                "report": report,
            }))
        }
        Commands::Tree {
            version,
            root,
            forest,
        } => {
            let dict = cache.get(&version).await?;
            let edges = derive_parent_edges(&dict);

            if forest {
                let trees = build_forest(&edges, &dict)?;
                info!(version = %version, trees = trees.len(), "relation forest built");
                return print_json(&trees);
            }

            let tree = build_tree(&root, &edges, &dict)?;
            let missing = unreachable(&tree, &dict);
            if !missing.is_empty() {
                warn!(version = %version, root = %root, unreachable = ?missing, "file types not reachable from root");
            }
            print_json(&tree)
        }
        Commands::Coverage { version, codelist } => {
            let dict = cache.get(&version).await?;
            let code_lists = cache.code_lists().await?;

            match codelist {
                Some(name) => {
                    let files = checked_coverage(&name, &dict, &code_lists)?;
                    print_json(&serde_json::json!({ "codeList": name, "fileTypes": files }))
                }
                None => print_json(&partition_code_lists(&code_lists, &dict)),
            }
        }
        Commands::Validate { version } => {
            let dict = cache.get(&version).await?;
            let code_lists = cache.code_lists().await?;
            let violations = DictionaryValidator::new(&dict, &code_lists).validate();
            print_json(&violations)?;

            if violations.is_valid() {
                Ok(())
            } else {
                Err(format!(
                    "dictionary {version} has {} constraint errors",
                    violations.errors.len()
                )
                .into())
            }
        }
        Commands::Versions => {
            let catalog = cache.catalog().await?;
            print_json(&catalog.summaries())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let cli = Cli::parse();
    let start = Instant::now();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %cli.dir.display(),
        command = ?cli.command,
        "Starting dictionary report"
    );

    let result = run(cli).await;
    match &result {
        Ok(()) => info!(latency_ms = start.elapsed().as_millis() as u64, "report complete"),
        Err(e) => tracing::error!(error = %e, "report failed"),
    }
    result
}
