use anyhow::{Context, Result};
use cartlab::{
    cli::{Cli, OutputFormat},
    config::EngineConfig,
    filter::ActiveFilter,
    pipeline::{DashboardSnapshot, ReactivePipeline},
    record::{ClassRecord, SubmissionRecord},
    store::MemoryStore,
};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Read a JSON array from disk
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Print the snapshot in the requested format
fn print_snapshot(snapshot: &DashboardSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print!("{}", snapshot.views.to_report_string());
            if !snapshot.class_tabs.classes.is_empty() {
                println!();
                println!("Classes (ALL: {}):", snapshot.class_tabs.all);
                for tab in &snapshot.class_tabs.classes {
                    println!("  {:<6} {:<20} {}", tab.code, tab.name, tab.count);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(snapshot)
                .context("Failed to serialize dashboard snapshot")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Invalid engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let store = MemoryStore::with_records(load_json::<SubmissionRecord>(&args.records)?);
    if let Some(path) = &args.classes {
        store.insert_classes(load_json::<ClassRecord>(path)?);
    }

    let pipeline = ReactivePipeline::connect(&store, &store, config, |_| {})?;
    pipeline.set_filter(ActiveFilter::from_selection(&args.class));

    let snapshot = pipeline
        .latest()
        .context("Pipeline published no snapshot")?;
    print_snapshot(&snapshot, args.format)?;

    pipeline.dispose();
    Ok(())
}
