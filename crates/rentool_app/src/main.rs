mod config;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rentool_core::BatchContext;
use rentool_engine::{
    ensure_store_dir, FileProgressStore, PollExit, PollSettings, Poller, ProgressStore,
};
use rentool_logging::{rentool_error, rentool_info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "rentool",
    version,
    about = "Follow archive operations through the shared progress slot"
)]
struct Cli {
    /// Path to a RON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the progress slot and print snapshots until the run finishes.
    Watch {
        /// Number of items in the batch being followed.
        #[arg(long)]
        batch_total: Option<u32>,
        /// Display names of the batch items, in order.
        #[arg(long = "batch-file")]
        batch_files: Vec<String>,
        /// Destination of the extraction, scanned for compiled scripts afterwards.
        #[arg(long)]
        extract_path: Option<PathBuf>,
    },
    /// Print the current progress record as JSON.
    Show,
    /// Remove the current progress record.
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            rentool_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::load(cli.config.as_deref())?;
    rentool_logging::initialize(&config.log_destination(), config.log_level()?);
    match &cli.config {
        Some(path) => rentool_info!("Using config {:?}", path),
        None => rentool_info!("Using default config location"),
    }

    ensure_store_dir(&config.store_dir)
        .with_context(|| format!("cannot use store directory {:?}", config.store_dir))?;
    let store = FileProgressStore::in_dir(&config.store_dir);
    rentool_info!("Using progress slot {:?}", store.path());

    match cli.command {
        Command::Watch {
            batch_total,
            batch_files,
            extract_path,
        } => {
            let batch = batch_context(batch_total, batch_files);
            let settings = PollSettings {
                interval: config.poll_interval(),
                batch,
                extract_path,
            };
            watch(&config, Arc::new(store), settings)
        }
        Command::Show => {
            match store.read() {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("no active operation"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Clear => {
            store.clear().context("failed to clear the progress slot")?;
            println!("cleared {}", store.path().display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn batch_context(total: Option<u32>, file_names: Vec<String>) -> Option<BatchContext> {
    let total = match total {
        Some(total) => total,
        None if !file_names.is_empty() => u32::try_from(file_names.len()).unwrap_or(u32::MAX),
        None => return None,
    };
    (total > 0).then_some(BatchContext { total, file_names })
}

fn watch(
    config: &AppConfig,
    store: Arc<dyn ProgressStore>,
    settings: PollSettings,
) -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    rentool_info!(
        "Watching with interval {:?} (poll_interval_ms = {})",
        settings.interval,
        config.poll_interval_ms
    );

    runtime.block_on(async move {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let poller = Poller::new(store, settings).spawn(tx, cancel.clone());

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        while let Some(view) = rx.recv().await {
            print!("{}", render::snapshot(&view));
        }

        let exit = poller.await.context("poller task failed")?;
        Ok(match exit {
            PollExit::Terminal(view) if view.is_failed => ExitCode::FAILURE,
            PollExit::Terminal(_) => ExitCode::SUCCESS,
            PollExit::Cancelled => {
                println!("stopped watching");
                ExitCode::SUCCESS
            }
            PollExit::Detached => ExitCode::SUCCESS,
        })
    })
}
