//! orders - view and edit the order sheet through the host process

mod grid;
mod page;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use order_sheets_bridge::{BridgeClient, HostConfig, OrderBridge};
use order_sheets_core::{CellValue, Column};
use tracing_subscriber::EnvFilter;

use crate::grid::render_grid;
use crate::page::{ManagerPage, OverviewPage};

#[derive(Parser)]
#[command(name = "orders")]
#[command(author, version, about = "View and edit the order sheet")]
struct Cli {
    /// Path to the order-sheets-host executable
    #[arg(long, global = true, value_name = "PATH")]
    host: Option<PathBuf>,

    /// Directory holding the data file (passed to the host)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Print every row
    Show,

    /// Print the row count and the sum of subtotals
    Overview,

    /// Pick a spreadsheet and print its rows
    Import {
        /// Import this file instead of opening the file dialog
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Replace the data file with the imported rows
        #[arg(long)]
        save: bool,
    },

    /// Set one cell
    Set {
        /// Row number as printed by `show` (1-based)
        row: usize,

        /// Column name, e.g. `quantity`
        column: Column,

        /// New value; numbers and TRUE/FALSE are stored as such
        value: String,
    },

    /// Append a blank row
    Add,

    /// Delete a row
    Remove {
        /// Row number as printed by `show` (1-based)
        row: usize,
    },

    /// Renumber the id column 1..n
    Renumber,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let client = BridgeClient::spawn_host(host_config(&cli))
        .context("Failed to start the host process")?;

    let mut page = ManagerPage::new(client);
    let stdout = io::stdout();
    let result = run(&mut page, cli.command, &mut stdout.lock()).await;

    page.into_bridge()
        .shutdown()
        .await
        .context("Failed to stop the host process")?;
    result
}

fn host_config(cli: &Cli) -> HostConfig {
    let select_file = match &cli.command {
        Commands::Import { file, .. } => file.clone(),
        _ => None,
    };
    HostConfig {
        host_exe_path: cli.host.clone(),
        data_dir: cli.data_dir.clone(),
        select_file,
        ..HostConfig::default()
    }
}

/// Execute one command against the page, writing what the user sees to `out`.
async fn run<B: OrderBridge>(
    page: &mut ManagerPage<B>,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Show => {
            page.load().await;
            write!(out, "{}", render_grid(page.dataset()))?;
        }
        Commands::Overview => {
            let overview = OverviewPage::load(page.bridge()).await;
            writeln!(out, "{overview}")?;
        }
        Commands::Import { save, .. } => {
            if page.import().await == 0 {
                writeln!(out, "Nothing imported")?;
                return Ok(());
            }
            write!(out, "{}", render_grid(page.dataset()))?;
            if save {
                save_page(page, out).await?;
            }
        }
        Commands::Set { row, column, value } => {
            page.load().await;
            let index = row_index(row)?;
            page.set_cell(index, column, CellValue::parse_input(&value))
                .with_context(|| format!("Cannot set {column} in row {row}"))?;
            save_page(page, out).await?;
        }
        Commands::Add => {
            page.load().await;
            let index = page.add_row();
            save_page(page, out).await?;
            writeln!(out, "Added row {}", index + 1)?;
        }
        Commands::Remove { row } => {
            page.load().await;
            page.remove_row(row_index(row)?)
                .with_context(|| format!("Cannot remove row {row}"))?;
            save_page(page, out).await?;
        }
        Commands::Renumber => {
            page.load().await;
            page.renumber();
            save_page(page, out).await?;
        }
    }
    Ok(())
}

async fn save_page<B: OrderBridge>(page: &mut ManagerPage<B>, out: &mut impl Write) -> Result<()> {
    if !page.save().await {
        bail!("Save failed; the host log has the cause");
    }
    writeln!(out, "Saved {} rows", page.dataset().len())?;
    Ok(())
}

fn row_index(row: usize) -> Result<usize> {
    match row.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("Row numbers start at 1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use order_sheets_core::{Dataset, RowRecord};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryBridge {
        file: Mutex<Dataset>,
    }

    #[async_trait]
    impl OrderBridge for MemoryBridge {
        async fn read_excel(&self) -> Dataset {
            self.file.lock().unwrap().clone()
        }

        async fn save_excel(&self, dataset: Dataset) -> bool {
            *self.file.lock().unwrap() = dataset;
            true
        }

        async fn select_and_read_excel(&self) -> Dataset {
            Dataset::new()
        }
    }

    async fn exec(page: &mut ManagerPage<MemoryBridge>, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("orders").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        run(page, cli.command, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from(["orders", "set", "2", "price", "4.5"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Set {
                row: 2,
                column: Column::Price,
                value: "4.5".to_string()
            }
        );
        assert!(Cli::try_parse_from(["orders", "set", "2", "colour", "red"]).is_err());
    }

    #[test]
    fn test_import_file_reaches_host() {
        let cli = Cli::try_parse_from(["orders", "import", "--file", "in.xlsx", "--save"]).unwrap();
        assert_eq!(host_config(&cli).select_file, Some(PathBuf::from("in.xlsx")));

        let cli = Cli::try_parse_from(["orders", "--data-dir", "/srv", "show"]).unwrap();
        let config = host_config(&cli);
        assert_eq!(config.select_file, None);
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv")));
    }

    #[tokio::test]
    async fn test_add_set_overview() {
        let mut page = ManagerPage::new(MemoryBridge::default());

        assert_eq!(exec(&mut page, &["add"]).await.unwrap(), "Saved 1 rows\nAdded row 1\n");
        exec(&mut page, &["set", "1", "quantity", "2"]).await.unwrap();
        exec(&mut page, &["set", "1", "price", "5"]).await.unwrap();

        let saved = page.bridge().read_excel().await;
        let row: &RowRecord = &saved[0];
        assert_eq!(row.column(Column::Subtotal), Some(&CellValue::Number(10.0)));

        let overview = exec(&mut page, &["overview"]).await.unwrap();
        assert_eq!(overview, "Rows:  1\nTotal: 10\n");
    }

    #[tokio::test]
    async fn test_row_zero_rejected() {
        let mut page = ManagerPage::new(MemoryBridge::default());
        assert!(exec(&mut page, &["remove", "0"]).await.is_err());
        assert!(exec(&mut page, &["remove", "1"]).await.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_import() {
        let mut page = ManagerPage::new(MemoryBridge::default());
        assert_eq!(exec(&mut page, &["import", "--save"]).await.unwrap(), "Nothing imported\n");
        assert!(page.bridge().read_excel().await.is_empty());
    }
}
