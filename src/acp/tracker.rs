use std::collections::HashMap;

use crate::acp::fragment::ArgumentFragmentFilter;
use crate::agent::event::THINK_TOOL;
use crate::agent::stream::ToolCallDelta;

/// Per-index state of one streamed tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallStreamState {
    pub tool_call_id: Option<String>,
    pub name: Option<String>,
    pub is_think: bool,
    pub started: bool,
    /// Argument fragments seen before the call could be started.
    pending_args: Vec<String>,
}

impl ToolCallStreamState {
    /// Argument fragments still waiting for the call to start.
    pub fn pending_fragments(&self) -> usize {
        self.pending_args.len()
    }

    fn ready(&self) -> bool {
        !self.started && !self.is_think && self.tool_call_id.is_some() && self.name.is_some()
    }
}

/// What a single tool-call delta asks the subscriber to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    Start { tool_call_id: String, name: String },
    Thought(String),
    Progress { tool_call_id: String, fragment: String },
}

/// Maps stream index to tool-call state for one LLM turn.
#[derive(Debug, Default)]
pub struct ToolCallStreamTracker {
    calls: HashMap<usize, ToolCallStreamState>,
    filter: ArgumentFragmentFilter,
}

impl ToolCallStreamTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one delta into the state machine and returns the sends it
    /// triggers, in the order they must go out.
    pub fn observe(&mut self, delta: &ToolCallDelta) -> Vec<StreamAction> {
        let mut actions = Vec::new();
        let id = delta.id();
        let name = delta.name();

        if !self.calls.contains_key(&delta.index) && id.is_none() && name.is_none() {
            if delta.arguments().is_some() {
                tracing::debug!(index = delta.index, "Dropping arguments for unknown tool call");
            }
            return actions;
        }
        let state = self.calls.entry(delta.index).or_default();

        if state.tool_call_id.is_none() {
            state.tool_call_id = id.map(str::to_string);
        }
        if state.name.is_none() {
            if let Some(name) = name {
                state.name = Some(name.to_string());
                state.is_think = name == THINK_TOOL;
            }
        }

        if state.ready() {
            if let (Some(tool_call_id), Some(name)) = (&state.tool_call_id, &state.name) {
                state.started = true;
                actions.push(StreamAction::Start {
                    tool_call_id: tool_call_id.clone(),
                    name: name.clone(),
                });
            }
        }

        // Buffered fragments go out right after the start, or as thoughts.
        if state.started || state.is_think {
            let buffered = std::mem::take(&mut state.pending_args);
            for fragment in buffered {
                push_fragment(&mut actions, state, &self.filter, fragment);
            }
        }

        if let Some(fragment) = delta.arguments() {
            if state.started || state.is_think {
                push_fragment(&mut actions, state, &self.filter, fragment.to_string());
            } else {
                state.pending_args.push(fragment.to_string());
            }
        }

        actions
    }

    pub fn state(&self, index: usize) -> Option<&ToolCallStreamState> {
        self.calls.get(&index)
    }

    /// Clears every index and returns how many buffered fragments were
    /// discarded with calls that never started.
    pub fn reset(&mut self) -> usize {
        self.calls
            .drain()
            .map(|(_, state)| state.pending_args.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

fn push_fragment(
    actions: &mut Vec<StreamAction>,
    state: &ToolCallStreamState,
    filter: &ArgumentFragmentFilter,
    fragment: String,
) {
    if state.is_think {
        if filter.filter(&fragment).is_some() {
            actions.push(StreamAction::Thought(fragment));
        }
    } else if let Some(tool_call_id) = &state.tool_call_id {
        actions.push(StreamAction::Progress {
            tool_call_id: tool_call_id.clone(),
            fragment,
        });
    }
}
