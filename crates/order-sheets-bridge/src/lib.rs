//! # order-sheets-bridge
//!
//! The narrow capability surface between the UI and the host process.
//!
//! [`OrderBridge`] is the whole contract: three calls, no file paths, no
//! other file-system access. The host implements it over a
//! [`Store`](order_sheets_store::Store) with [`HostHandler`] and exposes it
//! on a byte stream with [`serve`]; the UI reaches it through
//! [`BridgeClient`], which speaks the same newline-delimited JSON.
//!
//! ```no_run
//! use order_sheets_bridge::{BridgeClient, HostConfig, OrderBridge};
//!
//! # async fn demo() -> Result<(), order_sheets_bridge::BridgeError> {
//! let client = BridgeClient::spawn_host(HostConfig::default())?;
//! let rows = client.read_excel().await;
//! println!("{} rows", rows.len());
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod host;

pub use client::{BridgeClient, HostConfig};
pub use error::{BridgeError, BridgeResult};
pub use host::{handle_request, serve, HostHandler};

use async_trait::async_trait;
use order_sheets_core::Dataset;

/// Operations the UI may ask of the host.
///
/// None of these fail at this boundary. Reads that find nothing, are
/// cancelled, or break come back as an empty [`Dataset`]; a save that breaks
/// comes back as `false`. The cause is logged on the side that saw it.
#[async_trait]
pub trait OrderBridge: Send + Sync {
    /// Rows of the default data file.
    async fn read_excel(&self) -> Dataset;

    /// Overwrite the default data file with `dataset`.
    async fn save_excel(&self, dataset: Dataset) -> bool;

    /// Rows of a spreadsheet the user picks; the default file is not touched.
    async fn select_and_read_excel(&self) -> Dataset;
}
