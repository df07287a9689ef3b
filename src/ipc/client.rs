//! IPC Client
//!
//! Front-end side of the relay socket.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use super::{socket_path, RelayRequest, RelayResponse};
use crate::capture::ExplanationRequest;
use crate::error::{ExplainerError, ExplainerResult};

/// IPC Client for front-ends
#[derive(Debug, Clone)]
pub struct IpcClient {
    path: PathBuf,
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new(socket_path())
    }
}

impl IpcClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the relay daemon is running
    pub async fn is_relay_running(&self) -> bool {
        if !self.path.exists() {
            return false;
        }

        UnixStream::connect(&self.path).await.is_ok()
    }

    /// Send one request and wait for its response
    pub async fn send(&self, request: &RelayRequest) -> ExplainerResult<RelayResponse> {
        let stream = UnixStream::connect(&self.path).await.map_err(|e| {
            ExplainerError::Ipc(format!("relay not reachable at {:?}: {}", self.path, e))
        })?;
        let (reader, mut writer) = stream.into_split();

        let request_json = serde_json::to_string(request)? + "\n";
        writer.write_all(request_json.as_bytes()).await?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        reader.read_line(&mut line).await?;

        if line.trim().is_empty() {
            return Err(ExplainerError::Ipc("relay closed the connection".to_string()));
        }

        let response: RelayResponse = serde_json::from_str(line.trim())?;
        debug!("📨 IPC response: {:?}", response);
        Ok(response)
    }

    /// Relay an explanation request
    pub async fn query_llm(&self, request: &ExplanationRequest) -> ExplainerResult<String> {
        let response = self
            .send(&RelayRequest::QueryLlm {
                word: request.word().to_string(),
                context: request.context().to_string(),
            })
            .await?;
        Ok(response.into_explanation()?)
    }

    /// Ask the relay which models the upstream offers
    pub async fn check_models(&self) -> ExplainerResult<Vec<String>> {
        let response = self.send(&RelayRequest::CheckModels).await?;
        Ok(response.into_models()?)
    }

    /// Tell the relay to re-read its settings
    pub async fn reload_settings(&self) -> ExplainerResult<()> {
        let response = self.send(&RelayRequest::ReloadSettings).await?;
        if response.success {
            Ok(())
        } else {
            Err(ExplainerError::Ipc(
                response.error.unwrap_or_else(|| "reload failed".to_string()),
            ))
        }
    }
}
