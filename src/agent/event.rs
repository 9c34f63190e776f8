//! Discrete events emitted by the agent runtime.
//!
//! Every event can render itself to plain display text through [`Visualize`];
//! the bridge uses that text as notification content.

use serde::{Deserialize, Serialize};

pub const FILE_EDITOR_TOOL: &str = "file_editor";
pub const TERMINAL_TOOL: &str = "terminal";
pub const TASK_TRACKER_TOOL: &str = "task_tracker";
pub const THINK_TOOL: &str = "think";
pub const FINISH_TOOL: &str = "finish";

pub trait Visualize {
    fn visualize(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

impl From<&str> for TextContent {
    fn from(text: &str) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    ActionEvent(ActionEvent),
    ObservationEvent(ObservationEvent),
    UserRejectObservation(UserRejectObservation),
    AgentErrorEvent(AgentErrorEvent),
    MessageEvent(MessageEvent),
    SystemPromptEvent(SystemPromptEvent),
    PauseEvent(PauseEvent),
    Condensation(Condensation),
    CondensationRequest(CondensationRequest),
    ConversationStateUpdateEvent(ConversationStateUpdateEvent),
}

impl Event {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::ActionEvent(_) => "ActionEvent",
            Event::ObservationEvent(_) => "ObservationEvent",
            Event::UserRejectObservation(_) => "UserRejectObservation",
            Event::AgentErrorEvent(_) => "AgentErrorEvent",
            Event::MessageEvent(_) => "MessageEvent",
            Event::SystemPromptEvent(_) => "SystemPromptEvent",
            Event::PauseEvent(_) => "PauseEvent",
            Event::Condensation(_) => "Condensation",
            Event::CondensationRequest(_) => "CondensationRequest",
            Event::ConversationStateUpdateEvent(_) => "ConversationStateUpdateEvent",
        }
    }
}

impl Visualize for Event {
    fn visualize(&self) -> String {
        match self {
            Event::ActionEvent(e) => e.visualize(),
            Event::ObservationEvent(e) => e.visualize(),
            Event::UserRejectObservation(e) => e.visualize(),
            Event::AgentErrorEvent(e) => e.visualize(),
            Event::MessageEvent(e) => e.visualize(),
            Event::SystemPromptEvent(e) => e.visualize(),
            Event::PauseEvent(e) => e.visualize(),
            Event::Condensation(e) => e.visualize(),
            Event::CondensationRequest(e) => e.visualize(),
            Event::ConversationStateUpdateEvent(e) => e.visualize(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub tool_name: String,
    pub tool_call_id: String,
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub thought: Vec<TextContent>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

impl ActionEvent {
    pub fn thought_text(&self) -> String {
        self.thought
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Visualize for ActionEvent {
    fn visualize(&self) -> String {
        match &self.action {
            Some(action) => action.visualize(),
            None => format!("Tool call to `{}` was not executed", self.tool_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Action {
    FileEditor(FileEditorAction),
    Terminal(TerminalAction),
    TaskTracker(TaskTrackerAction),
    Think(ThinkAction),
    Finish(FinishAction),
    Generic(GenericAction),
}

impl Visualize for Action {
    fn visualize(&self) -> String {
        match self {
            Action::FileEditor(a) => a.visualize(),
            Action::Terminal(a) => a.visualize(),
            Action::TaskTracker(a) => a.visualize(),
            Action::Think(a) => a.thought.clone(),
            Action::Finish(a) => a.message.clone(),
            Action::Generic(a) => serde_json::to_string_pretty(&a.arguments).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEditorAction {
    pub command: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_line: Option<i64>,
    /// `[start, end]`, where an end of `-1` means end of file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_range: Option<Vec<i64>>,
}

impl Visualize for FileEditorAction {
    fn visualize(&self) -> String {
        let mut out = match self.command.as_str() {
            "view" => format!("Reading file: {}", self.path),
            "create" => format!("Creating file: {}", self.path),
            "insert" => format!(
                "Inserting into file: {} at line {}",
                self.path,
                self.insert_line.unwrap_or_default()
            ),
            "undo_edit" => format!("Undoing last edit: {}", self.path),
            _ => format!("Editing file: {}", self.path),
        };
        if let Some(range) = self.view_range.as_ref().filter(|r| r.len() == 2) {
            let end = if range[1] < 0 {
                "end".to_string()
            } else {
                range[1].to_string()
            };
            out.push_str(&format!(" (lines {}-{end})", range[0]));
        }
        if let Some(old) = &self.old_str {
            out.push_str(&format!("\n- {old}"));
        }
        if let Some(new) = &self.new_str {
            out.push_str(&format!("\n+ {new}"));
        }
        if let Some(text) = &self.file_text {
            out.push('\n');
            out.push_str(text);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalAction {
    pub command: String,
    #[serde(default)]
    pub is_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl Visualize for TerminalAction {
    fn visualize(&self) -> String {
        if self.is_input {
            format!("Sending input: {}", self.command)
        } else {
            format!("$ {}", self.command)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub status: TaskStatus,
}

fn render_task_list(tasks: &[TaskItem]) -> String {
    tasks
        .iter()
        .map(|t| {
            let mark = match t.status {
                TaskStatus::Todo => "[ ]",
                TaskStatus::InProgress => "[~]",
                TaskStatus::Done => "[x]",
            };
            format!("{mark} {}", t.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTrackerAction {
    #[serde(default = "default_task_command")]
    pub command: String,
    #[serde(default)]
    pub task_list: Vec<TaskItem>,
}

fn default_task_command() -> String {
    "view".into()
}

impl Visualize for TaskTrackerAction {
    fn visualize(&self) -> String {
        if self.task_list.is_empty() {
            return format!("Task tracker: {}", self.command);
        }
        format!(
            "Task tracker: {} ({} tasks)\n{}",
            self.command,
            self.task_list.len(),
            render_task_list(&self.task_list)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkAction {
    pub thought: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishAction {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericAction {
    #[serde(default)]
    pub arguments: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationEvent {
    pub tool_name: String,
    pub tool_call_id: String,
    pub observation: Observation,
}

impl Visualize for ObservationEvent {
    fn visualize(&self) -> String {
        self.observation.visualize()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Observation {
    FileEditor(FileEditorObservation),
    Terminal(TerminalObservation),
    TaskTracker(TaskTrackerObservation),
    Think(ThinkObservation),
    Finish(FinishObservation),
    Generic(GenericObservation),
}

impl Visualize for Observation {
    fn visualize(&self) -> String {
        match self {
            Observation::FileEditor(o) => match &o.error {
                Some(err) => format!("Error: {err}"),
                None => o.output.clone(),
            },
            Observation::Terminal(o) => match o.exit_code {
                Some(code) if code != 0 => format!("{}\n[exit code: {code}]", o.output),
                _ => o.output.clone(),
            },
            Observation::TaskTracker(o) => render_task_list(&o.task_list),
            Observation::Think(_) => "Your thought has been logged.".into(),
            Observation::Finish(_) => String::new(),
            Observation::Generic(o) => o.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEditorObservation {
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalObservation {
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTrackerObservation {
    #[serde(default = "default_task_command")]
    pub command: String,
    #[serde(default)]
    pub task_list: Vec<TaskItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkObservation {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinishObservation {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericObservation {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRejectObservation {
    pub tool_name: String,
    pub tool_call_id: String,
    #[serde(default)]
    pub rejection_reason: String,
}

impl Visualize for UserRejectObservation {
    fn visualize(&self) -> String {
        if self.rejection_reason.trim().is_empty() {
            "User rejected the action".into()
        } else {
            format!("User rejected the action: {}", self.rejection_reason)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentErrorEvent {
    pub tool_name: String,
    pub tool_call_id: String,
    pub error: String,
}

impl Visualize for AgentErrorEvent {
    fn visualize(&self) -> String {
        format!("Error: {}", self.error)
    }
}

// ---------------------------------------------------------------------------
// Messages and status events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub role: MessageRole,
    pub content: String,
}

impl Visualize for MessageEvent {
    fn visualize(&self) -> String {
        self.content.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPromptEvent {
    pub system_prompt: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Visualize for SystemPromptEvent {
    fn visualize(&self) -> String {
        if self.tools.is_empty() {
            return format!("System Prompt:\n{}", self.system_prompt);
        }
        format!(
            "System Prompt:\n{}\n\nTools Available: {}",
            self.system_prompt,
            self.tools.join(", ")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauseEvent {}

impl Visualize for PauseEvent {
    fn visualize(&self) -> String {
        "Agent paused".into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condensation {
    #[serde(default)]
    pub forgotten_event_ids: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Visualize for Condensation {
    fn visualize(&self) -> String {
        let mut out = format!(
            "Conversation condensed: {} events forgotten",
            self.forgotten_event_ids.len()
        );
        if let Some(summary) = self.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push_str("\nSummary: ");
            out.push_str(summary);
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CondensationRequest {}

impl Visualize for CondensationRequest {
    fn visualize(&self) -> String {
        "Conversation condensation requested".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStateUpdateEvent {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Visualize for ConversationStateUpdateEvent {
    fn visualize(&self) -> String {
        format!("{} = {}", self.key, self.value)
    }
}
