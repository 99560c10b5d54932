//! UI side of the bridge: a client stub for a host process.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use order_sheets_core::Dataset;
use order_sheets_protocol::{Command, Request, Response, ResponseData, ResponseResult};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::error::{BridgeError, BridgeResult};
use crate::OrderBridge;

/// Name of the host binary, without platform suffix
pub const HOST_EXE_NAME: &str = "order-sheets-host";

/// How to launch the host process.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Path to the host executable.
    /// If None, looks next to the current binary, then in `target/`, then on `PATH`.
    pub host_exe_path: Option<PathBuf>,

    /// Data directory passed to the host; the host's default when None.
    pub data_dir: Option<PathBuf>,

    /// Data file name passed to the host; the host's default when None.
    pub file_name: Option<String>,

    /// Run the host without a native file dialog.
    pub headless: bool,

    /// File the host hands back for every import instead of asking the
    /// user. Takes precedence over `headless`.
    pub select_file: Option<PathBuf>,
}

impl HostConfig {
    /// Command-line arguments for the host process
    fn host_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(dir) = &self.data_dir {
            args.push("--data-dir".into());
            args.push(dir.into());
        }
        if let Some(name) = &self.file_name {
            args.push("--file-name".into());
            args.push(name.into());
        }
        match &self.select_file {
            Some(file) => {
                args.push("--select-file".into());
                args.push(file.into());
            }
            None if self.headless => args.push("--headless".into()),
            None => {}
        }
        args
    }
}

/// Requests awaiting a response, keyed by id
#[derive(Default)]
struct PendingState {
    waiters: HashMap<u64, oneshot::Sender<Response>>,
    closed: bool,
}

type Pending = Arc<Mutex<PendingState>>;
type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// [`OrderBridge`] that forwards each call to a host over a byte stream.
///
/// Responses are matched to requests by id, so calls may overlap.
pub struct BridgeClient {
    writer: Mutex<BoxWriter>,
    pending: Pending,
    next_id: AtomicU64,
    reader_task: JoinHandle<()>,
    child: Option<Mutex<Child>>,
}

impl BridgeClient {
    /// Talk to a host already connected through `reader` and `writer`.
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: Pending = Arc::default();
        let reader_task = tokio::spawn(route_responses(reader, Arc::clone(&pending)));
        Self {
            writer: Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            reader_task,
            child: None,
        }
    }

    /// Start the host process and connect to its stdin/stdout.
    ///
    /// The host's stderr is inherited, so its logs show up in ours. Must be
    /// called from within a tokio runtime.
    pub fn spawn_host(config: HostConfig) -> BridgeResult<Self> {
        let exe_path = match config.host_exe_path.clone() {
            Some(path) if !path.exists() => {
                return Err(BridgeError::HostExeNotFound(path.display().to_string()))
            }
            Some(path) => path,
            None => find_host_exe(),
        };

        let mut cmd = tokio::process::Command::new(&exe_path);
        cmd.args(config.host_args());
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::HostExeNotFound(exe_path.display().to_string())
            } else {
                BridgeError::SpawnFailed(e)
            }
        })?;
        log::debug!("spawned host {}", exe_path.display());

        let stdin = child.stdin.take().ok_or(BridgeError::NotRunning)?;
        let stdout = child.stdout.take().ok_or(BridgeError::NotRunning)?;

        let mut client = Self::connect(stdout, stdin);
        client.child = Some(Mutex::new(child));
        Ok(client)
    }

    /// Send a command and wait for its response.
    pub async fn send_command(&self, command: Command) -> BridgeResult<Option<ResponseData>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut json = serde_json::to_string(&Request { id, command })?;
        json.push('\n');

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                return Err(BridgeError::NotRunning);
            }
            pending.waiters.insert(id, tx);
        }

        let sent = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(json.as_bytes()).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = sent {
            self.pending.lock().await.waiters.remove(&id);
            return Err(BridgeError::SendFailed(e));
        }

        // The sender is dropped when the host's output ends
        let response = rx.await.map_err(|_| BridgeError::NotRunning)?;
        match response.result {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => Err(BridgeError::Host(message)),
        }
    }

    async fn fetch_dataset(&self, command: Command) -> Dataset {
        let name = command.name();
        match self.send_command(command).await {
            Ok(Some(ResponseData::Dataset { dataset })) => dataset,
            Ok(_) => {
                log::error!("{}", BridgeError::UnexpectedResponse(name));
                Dataset::new()
            }
            Err(e) => {
                log::error!("{name} failed: {e}");
                Dataset::new()
            }
        }
    }

    /// Close the host's input and wait for it to exit.
    pub async fn shutdown(self) -> BridgeResult<()> {
        let Self {
            writer,
            reader_task,
            child,
            ..
        } = self;

        let mut writer = writer.into_inner();
        let _ = writer.shutdown().await;
        drop(writer);

        if let Some(child) = child {
            let mut child = child.into_inner();
            let status = child.wait().await.map_err(BridgeError::SpawnFailed)?;
            log::debug!("host exited with {status}");
        }
        reader_task.abort();
        Ok(())
    }
}

#[async_trait]
impl OrderBridge for BridgeClient {
    async fn read_excel(&self) -> Dataset {
        self.fetch_dataset(Command::ReadExcel).await
    }

    async fn save_excel(&self, dataset: Dataset) -> bool {
        match self.send_command(Command::SaveExcel { dataset }).await {
            Ok(Some(ResponseData::Saved { saved })) => saved,
            Ok(_) => {
                log::error!("{}", BridgeError::UnexpectedResponse("SaveExcel"));
                false
            }
            Err(e) => {
                log::error!("SaveExcel failed: {e}");
                false
            }
        }
    }

    async fn select_and_read_excel(&self) -> Dataset {
        self.fetch_dataset(Command::SelectAndReadExcel).await
    }
}

/// Deliver each response line to whoever is waiting on its id.
async fn route_responses<R: AsyncRead + Unpin>(reader: R, pending: Pending) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("host read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response: Response = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("unreadable response from host: {e}");
                continue;
            }
        };

        match pending.lock().await.waiters.remove(&response.id) {
            Some(tx) => {
                let _ = tx.send(response);
            }
            None => log::warn!("host sent response for unknown request {}", response.id),
        }
    }

    // Waiters see NotRunning
    let mut pending = pending.lock().await;
    pending.closed = true;
    pending.waiters.clear();
    log::debug!("host output closed");
}

/// Attempt to locate the host binary next to the current executable or in
/// the build directory.
fn find_host_exe() -> PathBuf {
    let file_name = format!("{HOST_EXE_NAME}{}", std::env::consts::EXE_SUFFIX);

    if let Ok(mut exe) = std::env::current_exe() {
        exe.pop();
        let candidate = exe.join(&file_name);
        if candidate.exists() {
            return candidate;
        }
    }

    for profile in ["release", "debug"] {
        let candidate = PathBuf::from("target").join(profile).join(&file_name);
        if candidate.exists() {
            return candidate;
        }
    }

    // Left to PATH lookup
    PathBuf::from(file_name)
}
