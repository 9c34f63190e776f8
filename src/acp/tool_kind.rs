use crate::acp::schema::ToolKind;
use crate::agent::event::{
    FILE_EDITOR_TOOL, FINISH_TOOL, TASK_TRACKER_TOOL, TERMINAL_TOOL, THINK_TOOL,
};

/// Protocol category for a tool name. Unknown tools are `Other`.
pub fn tool_kind(tool_name: &str) -> ToolKind {
    match tool_name {
        TERMINAL_TOOL => ToolKind::Execute,
        FILE_EDITOR_TOOL => ToolKind::Edit,
        THINK_TOOL => ToolKind::Think,
        FINISH_TOOL | TASK_TRACKER_TOOL => ToolKind::Other,
        name if name.starts_with("browser") => ToolKind::Fetch,
        _ => ToolKind::Other,
    }
}

/// Kind plus the default human title, which is the tool name itself.
pub fn classify(tool_name: &str) -> (ToolKind, String) {
    (tool_kind(tool_name), tool_name.to_string())
}
