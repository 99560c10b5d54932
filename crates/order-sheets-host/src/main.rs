//! order-sheets host - owns the data file, controlled by JSON commands over
//! stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! - Reads `Request` objects from stdin
//! - Writes `Response` objects to stdout
//! - Diagnostic/log messages go to stderr (never stdout)
//!
//! `--restore-backup` and `--info` act on the data file once and exit
//! without serving.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use order_sheets_bridge::{serve, HostHandler};
use order_sheets_store::{FilePicker, FixedPicker, NoPicker, Store, StoreConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "order-sheets-host")]
#[command(author, version, about = "Serve the order-sheets bridge on stdin/stdout")]
struct Args {
    /// Directory holding the data file (default: your documents directory)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Data file name inside the data directory
    #[arg(long, value_name = "NAME")]
    file_name: Option<String>,

    /// Do not copy the previous file aside before saving
    #[arg(long)]
    no_backup: bool,

    /// Never open a file dialog; imports are cancelled
    #[arg(long)]
    headless: bool,

    /// Answer every import with this file instead of asking
    #[arg(long, value_name = "PATH", conflicts_with = "headless")]
    select_file: Option<PathBuf>,

    /// Put the last backup back in place of the data file, then exit
    #[arg(long, conflicts_with = "info")]
    restore_backup: bool,

    /// Print the data file's path, size and modification time, then exit
    #[arg(long)]
    info: bool,
}

/// Where imports get their file from
#[derive(Debug, PartialEq)]
enum PickerChoice {
    Fixed(PathBuf),
    Headless,
    Native,
}

impl Args {
    fn store_config(&self) -> StoreConfig {
        let mut config = match &self.data_dir {
            Some(dir) => StoreConfig::in_dir(dir),
            None => StoreConfig::default(),
        };
        if let Some(name) = &self.file_name {
            config = config.with_file_name(name);
        }
        config.with_backup(!self.no_backup)
    }

    fn picker_choice(&self) -> PickerChoice {
        match &self.select_file {
            Some(path) => PickerChoice::Fixed(path.clone()),
            None if self.headless => PickerChoice::Headless,
            None => PickerChoice::Native,
        }
    }

    fn picker(&self) -> Box<dyn FilePicker> {
        match self.picker_choice() {
            PickerChoice::Fixed(path) => Box::new(FixedPicker::choosing(path)),
            PickerChoice::Headless => Box::new(NoPicker),
            PickerChoice::Native => native_picker(),
        }
    }
}

#[cfg(feature = "dialog")]
fn native_picker() -> Box<dyn FilePicker> {
    Box::new(order_sheets_store::DialogPicker)
}

#[cfg(not(feature = "dialog"))]
fn native_picker() -> Box<dyn FilePicker> {
    tracing::warn!("built without the file dialog; imports will be cancelled");
    Box::new(NoPicker)
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`). Library crates log
/// through `log`; those records are captured too.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Run a one-shot maintenance action if one was asked for.
///
/// Returns false when the host should serve instead.
fn run_once(args: &Args, store: &Store, out: &mut impl Write) -> Result<bool> {
    if args.restore_backup {
        if store
            .restore_backup()
            .context("Failed to restore the backup")?
        {
            writeln!(out, "Restored {}", store.data_path().display())?;
        } else {
            writeln!(out, "No backup to restore")?;
        }
        return Ok(true);
    }

    if args.info {
        match store.file_info().context("Failed to inspect the data file")? {
            Some(info) => {
                writeln!(out, "Path:     {}", info.path.display())?;
                writeln!(out, "Size:     {} bytes", info.size)?;
                writeln!(
                    out,
                    "Modified: {}",
                    info.modified.format("%Y-%m-%d %H:%M:%S")
                )?;
            }
            None => writeln!(out, "No data file at {}", store.data_path().display())?,
        }
        return Ok(true);
    }

    Ok(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = args.store_config();
    let store = Store::new(config, args.picker());
    if run_once(&args, &store, &mut std::io::stdout().lock())? {
        return Ok(());
    }

    tracing::info!(path = %store.data_path().display(), "starting up");
    let handler = Arc::new(HostHandler::new(store));

    serve(handler, tokio::io::stdin(), tokio::io::stdout())
        .await
        .context("bridge connection failed")?;

    tracing::info!("stdin closed, exiting");
    Ok(())
}
