use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::acp::bridge::ThreadBridge;
use crate::acp::dispatcher::{ErrorPolicy, EventDispatcher};
use crate::acp::schema::{SessionUpdate, ToolCallContent, ToolCallProgress, ToolCallStart};
use crate::acp::tool_kind::classify;
use crate::acp::tracker::{StreamAction, ToolCallStreamTracker};
use crate::agent::event::Event;
use crate::agent::stream::{Delta, StreamChunk};
use crate::core::config::{metrics_key, BridgeConfig};
use crate::core::error::AcpError;
use crate::core::stats::ConversationStats;

/// Converts one session's agent events and token deltas into ACP
/// notifications.
///
/// Both entry points are synchronous and meant to be called from the agent's
/// worker thread; delivery happens on the connection side of the bridge.
pub struct EventSubscriber {
    dispatcher: EventDispatcher,
    tracker: Mutex<ToolCallStreamTracker>,
    streaming_enabled: AtomicBool,
    event_policy: ErrorPolicy,
    streaming_policy: ErrorPolicy,
}

impl EventSubscriber {
    pub fn new(session_id: impl Into<String>, bridge: Arc<ThreadBridge>) -> Self {
        let config = BridgeConfig::default();
        Self {
            dispatcher: EventDispatcher::new(session_id, bridge, config.metrics_key()),
            tracker: Mutex::new(ToolCallStreamTracker::new()),
            streaming_enabled: AtomicBool::new(config.streaming_enabled),
            event_policy: ErrorPolicy::Swallow,
            streaming_policy: ErrorPolicy::token_streaming(),
        }
    }

    pub fn from_config(
        session_id: impl Into<String>,
        bridge: Arc<ThreadBridge>,
        config: &BridgeConfig,
    ) -> Self {
        Self::new(session_id, bridge)
            .with_metrics_namespace(&config.metrics_namespace)
            .with_streaming(config.streaming_enabled)
    }

    pub fn with_stats(mut self, stats: Arc<dyn ConversationStats>) -> Self {
        self.dispatcher = self.dispatcher.with_stats(stats);
        self
    }

    pub fn with_streaming(self, enabled: bool) -> Self {
        self.set_streaming_enabled(enabled);
        self
    }

    pub fn with_metrics_namespace(mut self, namespace: &str) -> Self {
        self.dispatcher = self.dispatcher.with_metrics_key(metrics_key(namespace));
        self
    }

    pub fn session_id(&self) -> &str {
        self.dispatcher.session_id()
    }

    pub fn streaming_enabled(&self) -> bool {
        self.streaming_enabled.load(Ordering::SeqCst)
    }

    pub fn set_streaming_enabled(&self, enabled: bool) {
        self.streaming_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Discrete-event callback. Never fails; a bad event is logged at debug
    /// level and dropped.
    pub fn handle(&self, event: &Event) {
        let result = self.dispatcher.dispatch(event, self.streaming_enabled());
        let _ = self.event_policy.apply(event.kind_name(), result);
    }

    /// Token-streaming callback. Failures come back as an internal error
    /// tagged "Error during token streaming".
    pub fn on_token(&self, chunk: &StreamChunk) -> Result<(), AcpError> {
        let result = self.stream_chunk(chunk);
        self.streaming_policy.apply("token", result)
    }

    /// Forgets all per-turn tool-call stream state, including arguments of
    /// calls that never got both an id and a name.
    pub fn reset_turn(&self) {
        let discarded = self.tracker().reset();
        if discarded > 0 {
            tracing::debug!(discarded, "Dropped argument fragments of unstarted tool calls");
        }
    }

    /// Number of tool calls seen on the token path this turn.
    pub fn tracked_tool_calls(&self) -> usize {
        self.tracker().len()
    }

    fn tracker(&self) -> MutexGuard<'_, ToolCallStreamTracker> {
        match self.tracker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn stream_chunk(&self, chunk: &StreamChunk) -> Result<(), AcpError> {
        for delta in chunk.choices.iter().filter_map(|c| c.delta.as_ref()) {
            self.stream_delta(delta)?;
        }
        Ok(())
    }

    fn stream_delta(&self, delta: &Delta) -> Result<(), AcpError> {
        if let Some(tool_calls) = &delta.tool_calls {
            for tool_call in tool_calls {
                // Hold the lock only while folding the delta, not while sending.
                let actions = self.tracker().observe(tool_call);
                for action in actions {
                    self.dispatcher.send(stream_update(action), false)?;
                }
            }
        }

        if let Some(reasoning) = delta.reasoning() {
            self.dispatcher
                .send(SessionUpdate::thought_text(reasoning), false)?;
        }
        if let Some(text) = delta.text() {
            self.dispatcher.send(SessionUpdate::message_text(text), false)?;
        }
        Ok(())
    }
}

fn stream_update(action: StreamAction) -> SessionUpdate {
    match action {
        StreamAction::Start { tool_call_id, name } => {
            let (kind, title) = classify(&name);
            SessionUpdate::ToolCall(ToolCallStart::new(tool_call_id, title, kind))
        }
        StreamAction::Thought(text) => SessionUpdate::thought_text(text),
        StreamAction::Progress {
            tool_call_id,
            fragment,
        } => SessionUpdate::ToolCallUpdate(ToolCallProgress {
            content: Some(vec![ToolCallContent::text(fragment)]),
            ..ToolCallProgress::new(tool_call_id)
        }),
    }
}
