//! Discrete event path: turns each agent event into session updates.
//!
//! [`translate`] is the pure routing step; [`EventDispatcher`] attaches the
//! metrics side-channel and hands the results to the [`ThreadBridge`].

use std::sync::Arc;

use crate::acp::bridge::ThreadBridge;
use crate::acp::metrics::metrics_meta;
use crate::acp::schema::{
    format_content_blocks, PlanEntry, PlanEntryPriority, PlanEntryStatus, SessionNotification,
    SessionUpdate, ToolCallLocation, ToolCallProgress, ToolCallStart, ToolCallStatus, ToolKind,
};
use crate::acp::tool_kind::classify;
use crate::agent::event::{
    Action, ActionEvent, Event, FileEditorAction, MessageEvent, MessageRole, Observation,
    TaskItem, TaskStatus, Visualize,
};
use crate::core::error::AcpError;
use crate::core::stats::ConversationStats;

pub const TOKEN_STREAMING_ERROR: &str = "Error during token streaming";
pub const NOT_EXECUTED_TITLE: &str = "Agent Action (Not Executed)";
pub const PLAN_UPDATED_TITLE: &str = "Plan updated";

/// How an entry point treats a failure while building or sending updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log at debug level and drop the event.
    Swallow,
    /// Wrap into [`AcpError::Internal`] with `reason` and return it.
    Propagate { reason: String },
}

impl ErrorPolicy {
    pub fn token_streaming() -> Self {
        Self::Propagate {
            reason: TOKEN_STREAMING_ERROR.into(),
        }
    }

    pub fn apply(&self, context: &str, result: Result<(), AcpError>) -> Result<(), AcpError> {
        match (self, result) {
            (_, Ok(())) => Ok(()),
            (Self::Swallow, Err(e)) => {
                tracing::debug!(context, error = %e, "Error processing event");
                Ok(())
            }
            (Self::Propagate { reason }, Err(e)) => {
                Err(AcpError::internal_error(reason.clone(), e.to_string()))
            }
        }
    }
}

/// Session updates for one discrete event, in send order.
///
/// `streaming_enabled` suppresses complete assistant messages whose text was
/// already delivered through the token path.
pub fn translate(event: &Event, streaming_enabled: bool) -> Result<Vec<SessionUpdate>, AcpError> {
    match event {
        Event::ConversationStateUpdateEvent(_) => Ok(Vec::new()),
        Event::ActionEvent(e) => action_updates(e),
        Event::ObservationEvent(e) => match &e.observation {
            Observation::Think(_) | Observation::Finish(_) => Ok(Vec::new()),
            Observation::TaskTracker(o) => Ok(vec![
                SessionUpdate::Plan {
                    entries: plan_entries(&o.task_list),
                },
                SessionUpdate::ToolCallUpdate(ToolCallProgress {
                    status: Some(ToolCallStatus::Completed),
                    raw_output: Some(serde_json::to_value(e)?),
                    ..ToolCallProgress::new(&e.tool_call_id)
                }),
            ]),
            _ => Ok(vec![tool_call_close(
                &e.tool_call_id,
                ToolCallStatus::Completed,
                &e.visualize(),
                serde_json::to_value(e)?,
            )]),
        },
        Event::UserRejectObservation(e) => Ok(vec![tool_call_close(
            &e.tool_call_id,
            ToolCallStatus::Failed,
            &e.visualize(),
            serde_json::to_value(e)?,
        )]),
        Event::AgentErrorEvent(e) => Ok(vec![tool_call_close(
            &e.tool_call_id,
            ToolCallStatus::Failed,
            &e.visualize(),
            serde_json::to_value(e)?,
        )]),
        Event::MessageEvent(e) => Ok(message_update(e, streaming_enabled).into_iter().collect()),
        Event::SystemPromptEvent(_)
        | Event::PauseEvent(_)
        | Event::Condensation(_)
        | Event::CondensationRequest(_) => {
            let text = event.visualize();
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![SessionUpdate::thought_text(text)])
        }
    }
}

fn action_updates(event: &ActionEvent) -> Result<Vec<SessionUpdate>, AcpError> {
    let mut updates = Vec::new();

    if let Some(reasoning) = event
        .reasoning_content
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        updates.push(SessionUpdate::thought_text(format!(
            "**Reasoning**:\n{reasoning}\n"
        )));
    }

    let thought = event.thought_text();
    let thought = thought.trim();
    if !thought.is_empty() {
        updates.push(SessionUpdate::thought_text(format!(
            "\n**Thought**:\n{thought}\n"
        )));
    }

    let Some(action) = &event.action else {
        let (kind, _) = classify(&event.tool_name);
        updates.push(SessionUpdate::ToolCall(ToolCallStart::new(
            &event.tool_call_id,
            NOT_EXECUTED_TITLE,
            kind,
        )));
        return Ok(updates);
    };

    let rendered = event.visualize();
    let (mut kind, mut title) = classify(&event.tool_name);
    match action {
        Action::FileEditor(a) if a.command == "view" => {
            kind = ToolKind::Read;
            title = format!("Reading {}", a.path);
        }
        Action::FileEditor(a) => {
            kind = ToolKind::Edit;
            title = format!("Editing {}", a.path);
        }
        Action::Terminal(a) => title = a.command.clone(),
        Action::TaskTracker(_) => title = PLAN_UPDATED_TITLE.into(),
        Action::Think(_) => {
            if !rendered.trim().is_empty() {
                updates.push(SessionUpdate::thought_text(rendered));
            }
            return Ok(updates);
        }
        Action::Finish(_) => {
            if !rendered.trim().is_empty() {
                updates.push(SessionUpdate::message_text(rendered));
            }
            return Ok(updates);
        }
        Action::Generic(_) => {}
    }

    let mut start = ToolCallStart::new(&event.tool_call_id, title, kind);
    start.content = format_content_blocks(&rendered).unwrap_or_default();
    start.locations = action_locations(action);
    start.raw_input = Some(serde_json::to_value(action)?);
    updates.push(SessionUpdate::ToolCall(start));
    Ok(updates)
}

/// File locations touched by an action, for clients that follow the agent.
pub fn action_locations(action: &Action) -> Vec<ToolCallLocation> {
    match action {
        Action::FileEditor(a) if !a.path.is_empty() => vec![file_editor_location(a)],
        _ => Vec::new(),
    }
}

// Negative values ("-1" means end of file) carry no usable line.
fn file_editor_location(action: &FileEditorAction) -> ToolCallLocation {
    let line = action
        .view_range
        .as_ref()
        .and_then(|range| range.first().copied())
        .and_then(|start| u32::try_from(start).ok())
        .or_else(|| action.insert_line.and_then(|line| u32::try_from(line).ok()));
    ToolCallLocation {
        path: action.path.clone(),
        line,
    }
}

pub fn plan_entries(tasks: &[TaskItem]) -> Vec<PlanEntry> {
    tasks
        .iter()
        .map(|task| PlanEntry {
            content: task.title.clone(),
            priority: PlanEntryPriority::Medium,
            status: match task.status {
                TaskStatus::Todo => PlanEntryStatus::Pending,
                TaskStatus::InProgress => PlanEntryStatus::InProgress,
                TaskStatus::Done => PlanEntryStatus::Completed,
            },
        })
        .collect()
}

// The close message always goes out, even with nothing to show.
fn tool_call_close(
    tool_call_id: &str,
    status: ToolCallStatus,
    rendered: &str,
    raw_output: serde_json::Value,
) -> SessionUpdate {
    SessionUpdate::ToolCallUpdate(ToolCallProgress {
        status: Some(status),
        content: format_content_blocks(rendered),
        raw_output: Some(raw_output),
        ..ToolCallProgress::new(tool_call_id)
    })
}

fn message_update(event: &MessageEvent, streaming_enabled: bool) -> Option<SessionUpdate> {
    let text = event.visualize();
    if text.trim().is_empty() {
        return None;
    }
    match event.role {
        // The client echoes user input as soon as it is submitted.
        MessageRole::User => None,
        _ if streaming_enabled => {
            tracing::debug!("Skipping complete message event, already streamed");
            None
        }
        _ => Some(SessionUpdate::message_text(text)),
    }
}

/// Sends session updates for one session through a [`ThreadBridge`].
pub struct EventDispatcher {
    session_id: String,
    bridge: Arc<ThreadBridge>,
    stats: Option<Arc<dyn ConversationStats>>,
    metrics_key: String,
}

impl EventDispatcher {
    pub fn new(
        session_id: impl Into<String>,
        bridge: Arc<ThreadBridge>,
        metrics_key: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            bridge,
            stats: None,
            metrics_key: metrics_key.into(),
        }
    }

    pub fn with_stats(mut self, stats: Arc<dyn ConversationStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_metrics_key(mut self, metrics_key: impl Into<String>) -> Self {
        self.metrics_key = metrics_key.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Routes one discrete event. Stops at the first failed send; the caller
    /// decides what a failure means.
    pub fn dispatch(&self, event: &Event, streaming_enabled: bool) -> Result<(), AcpError> {
        translate(event, streaming_enabled)?
            .into_iter()
            .try_for_each(|update| self.send(update, true))
    }

    /// Schedules one update. Only discrete-path updates carry metrics.
    pub fn send(&self, update: SessionUpdate, with_metrics: bool) -> Result<(), AcpError> {
        let meta = if with_metrics {
            metrics_meta(&self.metrics_key, self.stats.as_deref())
        } else {
            None
        };
        self.bridge.schedule(SessionNotification {
            session_id: self.session_id.clone(),
            update,
            meta,
        })
    }
}
