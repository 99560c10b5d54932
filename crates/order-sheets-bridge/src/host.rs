//! Host side of the bridge.
//!
//! Protocol: one JSON object per line.
//! - Reads [`Request`] objects from the reader
//! - Writes [`Response`] objects to the writer
//! - Diagnostics go through `log`, never to the writer

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use order_sheets_core::Dataset;
use order_sheets_protocol::{Command, Request, Response};
use order_sheets_store::Store;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::OrderBridge;

/// [`OrderBridge`] over a [`Store`].
///
/// Store calls block on file IO and, for imports, on the user answering the
/// picker, so each one runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct HostHandler {
    store: Arc<Store>,
}

impl HostHandler {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    async fn run_blocking<T, F>(&self, what: &str, f: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&Store) -> T + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || f(&store)).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("{what} task failed: {e}");
                T::default()
            }
        }
    }
}

#[async_trait]
impl OrderBridge for HostHandler {
    async fn read_excel(&self) -> Dataset {
        self.run_blocking("ReadExcel", Store::read_default).await
    }

    async fn save_excel(&self, dataset: Dataset) -> bool {
        self.run_blocking("SaveExcel", move |store| store.write(&dataset))
            .await
    }

    async fn select_and_read_excel(&self) -> Dataset {
        self.run_blocking("SelectAndReadExcel", Store::read_user_selected)
            .await
    }
}

/// Run one request against `bridge`.
pub async fn handle_request<B: OrderBridge + ?Sized>(bridge: &B, request: Request) -> Response {
    let id = request.id;
    match request.command {
        Command::ReadExcel => Response::dataset(id, bridge.read_excel().await),
        Command::SaveExcel { dataset } => Response::saved(id, bridge.save_excel(dataset).await),
        Command::SelectAndReadExcel => {
            Response::dataset(id, bridge.select_and_read_excel().await)
        }
    }
}

/// Serve `bridge` until `reader` reaches end of input.
///
/// Each request runs as its own task and its response is written when it
/// completes, so responses may come back in a different order than the
/// requests. Requests still running when input ends are allowed to finish.
pub async fn serve<B, R, W>(bridge: Arc<B>, reader: R, writer: W) -> io::Result<()>
where
    B: OrderBridge + ?Sized + 'static,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Response>();
    let writer_task = tokio::spawn(write_responses(rx, writer));

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                log::debug!("request {} {}", request.id, request.command.name());
                let bridge = Arc::clone(&bridge);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = handle_request(bridge.as_ref(), request).await;
                    // The writer only goes away once every sender is dropped
                    let _ = tx.send(response);
                });
            }
            Err(e) => {
                log::warn!("JSON parse error: {e}");
                log::debug!("line was: {line}");
                // id 0: the request id could not be read
                let _ = tx.send(Response::error(0, format!("JSON parse error: {e}")));
            }
        }
    }

    log::debug!("input closed, waiting for in-flight requests");
    drop(tx);
    writer_task.await.map_err(io::Error::other)?
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<Response>, mut writer: W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
