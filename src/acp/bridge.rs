//! Hands notifications from the agent's worker thread to the connection.
//!
//! The agent runtime calls the subscriber synchronously from its own thread,
//! while the connection lives on a tokio runtime. In channel mode a bounded
//! queue feeds a single consumer task, so notifications reach the connection
//! in the order they were scheduled. Inline mode sends on the calling thread
//! and is meant for synchronous harnesses that have no runtime running.
//!
//! Waiting is never done on an async worker. On a multi-thread runtime the
//! wait steps out through `block_in_place`; on a current-thread runtime it is
//! impossible, so the send fails with [`AcpError::Send`] instead.

use std::sync::Arc;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::acp::client::Client;
use crate::acp::schema::SessionNotification;
use crate::core::error::AcpError;

pub struct ThreadBridge {
    mode: Mode,
}

enum Mode {
    Channel(mpsc::Sender<SessionNotification>),
    Inline {
        client: Arc<dyn Client>,
        // Taken on drop.
        runtime: Option<Runtime>,
    },
}

impl ThreadBridge {
    /// Spawns the consumer task on `handle`. The task ends once every bridge
    /// handle is dropped and the queue is drained.
    pub fn spawn(
        client: Arc<dyn Client>,
        capacity: usize,
        handle: &Handle,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = handle.spawn(drain(rx, client));
        (
            Self {
                mode: Mode::Channel(tx),
            },
            worker,
        )
    }

    /// Sends on the calling thread. From inside a current-thread runtime
    /// every send fails, since it cannot be waited on there.
    pub fn inline(client: Arc<dyn Client>) -> Result<Self, AcpError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AcpError::internal_error("Failed to start inline runtime", e.to_string()))?;
        Ok(Self {
            mode: Mode::Inline {
                client,
                runtime: Some(runtime),
            },
        })
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.mode, Mode::Inline { .. })
    }

    /// Queues one notification without waiting for delivery. Blocks only
    /// while the channel is full.
    pub fn schedule(&self, notification: SessionNotification) -> Result<(), AcpError> {
        match &self.mode {
            Mode::Channel(tx) => match tx.try_send(notification) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(notification)) => {
                    block_outside_runtime("notification queue full", || {
                        tx.blocking_send(notification)
                            .map_err(|_| AcpError::ConnectionClosed)
                    })
                }
                Err(TrySendError::Closed(_)) => Err(AcpError::ConnectionClosed),
            },
            Mode::Inline { client, runtime } => {
                let Some(runtime) = runtime else {
                    return Err(AcpError::ConnectionClosed);
                };
                block_outside_runtime("inline send inside a current-thread runtime", || {
                    runtime.block_on(client.session_update(notification))
                })
            }
        }
    }
}

impl Drop for ThreadBridge {
    fn drop(&mut self) {
        // A runtime may not be dropped inside another one; the inline
        // runtime never spawns tasks, so a background shutdown loses nothing.
        if let Mode::Inline { runtime, .. } = &mut self.mode {
            if let Some(runtime) = runtime.take() {
                runtime.shutdown_background();
            }
        }
    }
}

/// Runs a blocking wait. Plain threads wait directly; a multi-thread runtime
/// worker hands its core off first; a current-thread runtime gets an error.
fn block_outside_runtime(
    busy: &str,
    wait: impl FnOnce() -> Result<(), AcpError>,
) -> Result<(), AcpError> {
    match Handle::try_current() {
        Err(_) => wait(),
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => tokio::task::block_in_place(wait),
            _ => Err(AcpError::Send(busy.to_string())),
        },
    }
}

async fn drain(mut rx: mpsc::Receiver<SessionNotification>, client: Arc<dyn Client>) {
    while let Some(notification) = rx.recv().await {
        let kind = notification.update.kind_name();
        if let Err(e) = client.session_update(notification).await {
            tracing::debug!(kind, error = %e, "Error sending session update");
        }
    }
    tracing::debug!("Notification channel closed");
}
