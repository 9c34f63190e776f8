use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::acp::schema::SessionNotification;
use crate::core::error::AcpError;

pub const SESSION_UPDATE_METHOD: &str = "session/update";

/// The client side of an ACP connection, as seen from the agent.
#[async_trait]
pub trait Client: Send + Sync {
    async fn session_update(&self, notification: SessionNotification) -> Result<(), AcpError>;
}

#[async_trait]
impl<C: Client + ?Sized> Client for Arc<C> {
    async fn session_update(&self, notification: SessionNotification) -> Result<(), AcpError> {
        (**self).session_update(notification).await
    }
}

/// Wraps a notification in a JSON-RPC 2.0 `session/update` envelope.
pub fn to_rpc_message(notification: &SessionNotification) -> Result<serde_json::Value, AcpError> {
    Ok(serde_json::json!({
        "jsonrpc": "2.0",
        "method": SESSION_UPDATE_METHOD,
        "params": serde_json::to_value(notification)?,
    }))
}

/// Writes each notification as one JSON-RPC line (stdio transport).
pub struct NdjsonClient<W> {
    writer: Mutex<W>,
}

impl NdjsonClient<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> NdjsonClient<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Client for NdjsonClient<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn session_update(&self, notification: SessionNotification) -> Result<(), AcpError> {
        let mut line = serde_json::to_string(&to_rpc_message(&notification)?)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AcpError::Send(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| AcpError::Send(e.to_string()))
    }
}

/// Records every outgoing notification to a JSONL file before forwarding it.
///
/// Logging is best effort: if the log directory cannot be created or a write
/// fails, the decorator keeps forwarding and only the log is lost.
pub struct DebugLogClient<C> {
    inner: C,
    log_file: PathBuf,
    file: Mutex<Option<tokio::fs::File>>,
    enabled: bool,
}

impl<C: Client> DebugLogClient<C> {
    pub fn new(inner: C, log_dir: &Path) -> Self {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%SZ");
        let log_file = log_dir.join(format!("{timestamp}_acp.jsonl"));

        let enabled = match std::fs::create_dir_all(log_dir) {
            Ok(()) => {
                tracing::info!(path = %log_file.display(), "ACP debug logging enabled");
                true
            }
            Err(e) => {
                tracing::warn!(
                    dir = %log_dir.display(),
                    error = %e,
                    "Failed to create ACP debug log directory"
                );
                false
            }
        };

        Self {
            inner,
            log_file,
            file: Mutex::new(None),
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    async fn write_entry(&self, notification: &SessionNotification) -> std::io::Result<()> {
        let entry = serde_json::json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "<<<",
            "msg": to_rpc_message(notification).map_err(std::io::Error::other)?,
        });
        let mut line = entry.to_string();
        line.push('\n');

        let mut guard = self.file.lock().await;
        if guard.is_none() {
            let file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
                .await?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Client> Client for DebugLogClient<C> {
    async fn session_update(&self, notification: SessionNotification) -> Result<(), AcpError> {
        if self.enabled {
            if let Err(e) = self.write_entry(&notification).await {
                tracing::warn!(error = %e, "Failed to write ACP debug log entry");
            }
        }
        self.inner.session_update(notification).await
    }
}
