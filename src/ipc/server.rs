//! IPC Server
//!
//! Unix socket server run by the relay daemon. Every connection gets its own
//! task, so concurrent front-ends turn into independent upstream calls.

use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{RelayRequest, RelayResponse, MAX_REQUEST_BYTES};
use crate::capture::ExplanationRequest;
use crate::config::{self, Settings};
use crate::relay::Relay;

/// IPC Server for the relay daemon
pub struct IpcServer {
    relay: Arc<RwLock<Relay>>,
    settings_path: PathBuf,
    running: Arc<AtomicBool>,
    socket: Option<PathBuf>,
    task: Option<JoinHandle<()>>,
}

impl IpcServer {
    /// Create new IPC server around `relay`
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(RwLock::new(relay)),
            settings_path: config::config_path(),
            running: Arc::new(AtomicBool::new(false)),
            socket: None,
            task: None,
        }
    }

    /// Settings file re-read on `reloadSettings`
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }

    /// Bind `path` and start accepting. Must be called inside a Tokio runtime.
    pub fn start(&mut self, path: &Path) -> Result<()> {
        // Restarting replaces the previous accept loop
        self.stop();

        // Clean up stale socket
        if path.exists() {
            let _ = fs::remove_file(path);
        }

        let listener = UnixListener::bind(path)?;

        // Set strict permissions (user only: RW-------)
        if let Ok(metadata) = fs::metadata(path) {
            let mut perms = metadata.permissions();
            perms.set_mode(0o600);
            if let Err(e) = fs::set_permissions(path, perms) {
                warn!("⚠️ Failed to set strict IPC socket permissions: {}", e);
            } else {
                debug!("🔒 IPC socket permissions set to 0600");
            }
        }

        self.running.store(true, Ordering::SeqCst);
        self.socket = Some(path.to_path_buf());
        let relay = self.relay.clone();
        let settings_path = Arc::new(self.settings_path.clone());

        info!("🔌 IPC server listening on {:?}", path);

        let task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let relay = relay.clone();
                        let settings_path = settings_path.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, relay, &settings_path).await {
                                warn!("IPC client error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("IPC accept error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        });

        self.task = Some(task);
        Ok(())
    }

    /// Stop accepting and remove the socket file
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(path) = self.socket.take() {
            let _ = fs::remove_file(&path);
            info!("🔌 IPC server stopped");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handle a single client connection: one request line, one response line
async fn handle_client(
    stream: UnixStream,
    relay: Arc<RwLock<Relay>>,
    settings_path: &Path,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();

    // Message size limit
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_BYTES));
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line).await?;

    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let response = match parse_request(&line) {
        Ok(request) => {
            debug!("📨 IPC request: {:?}", request);
            dispatch(request, &relay, settings_path).await
        }
        Err(reason) => {
            warn!("⚠️ Rejecting malformed IPC request: {}", reason);
            RelayResponse::failure(reason)
        }
    };

    let response_json = serde_json::to_string(&response)? + "\n";
    writer.write_all(response_json.as_bytes()).await?;
    writer.shutdown().await?;

    Ok(())
}

/// Decode one request line as read from the socket (at most
/// `MAX_REQUEST_BYTES`, newline included when present)
fn parse_request(line: &[u8]) -> Result<RelayRequest, String> {
    if line.len() as u64 >= MAX_REQUEST_BYTES && line.last() != Some(&b'\n') {
        return Err(format!(
            "request too large (limit {} bytes)",
            MAX_REQUEST_BYTES
        ));
    }

    let text = std::str::from_utf8(line).map_err(|e| format!("invalid request: {}", e))?;
    serde_json::from_str(text.trim()).map_err(|e| format!("invalid request: {}", e))
}

/// Answer one request. Never fails; errors become failure responses.
async fn dispatch(
    request: RelayRequest,
    relay: &RwLock<Relay>,
    settings_path: &Path,
) -> RelayResponse {
    match request {
        RelayRequest::QueryLlm { word, context } => {
            // Clone out so no lock is held across the upstream call
            let relay = relay.read().await.clone();
            let request = ExplanationRequest::new(word, context);
            RelayResponse::from_explanation(relay.explain(&request).await)
        }
        RelayRequest::CheckModels => {
            let relay = relay.read().await.clone();
            RelayResponse::from_models(relay.list_available_models().await)
        }
        RelayRequest::ReloadSettings => match Settings::load_from(settings_path) {
            Ok(settings) => {
                let rebuilt = Relay::from_settings(&settings);
                info!("📡 Settings reloaded, provider: {}", rebuilt.backend_name());
                *relay.write().await = rebuilt;
                RelayResponse::ack()
            }
            Err(e) => {
                warn!("Failed to reload settings: {}", e);
                RelayResponse::failure(format!("failed to reload settings: {}", e))
            }
        },
    }
}
