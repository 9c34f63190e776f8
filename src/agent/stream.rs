use serde::{Deserialize, Serialize};

/// One incremental model-output chunk (OpenAI-style `chat.completion.chunk`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Option<Delta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

// Some gateways send `""` for name/id on continuation deltas.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl ToolCallDelta {
    pub fn id(&self) -> Option<&str> {
        non_empty(self.id.as_ref())
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(self.function.as_ref().and_then(|f| f.name.as_ref()))
    }

    pub fn arguments(&self) -> Option<&str> {
        non_empty(self.function.as_ref().and_then(|f| f.arguments.as_ref()))
    }
}

impl Delta {
    pub fn reasoning(&self) -> Option<&str> {
        non_empty(self.reasoning_content.as_ref())
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(self.content.as_ref())
    }
}

impl StreamChunk {
    pub fn content(text: &str) -> Self {
        Self::from_delta(Delta {
            content: Some(text.into()),
            ..Default::default()
        })
    }

    pub fn reasoning(text: &str) -> Self {
        Self::from_delta(Delta {
            reasoning_content: Some(text.into()),
            ..Default::default()
        })
    }

    pub fn tool_call(
        index: usize,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) -> Self {
        Self::from_delta(Delta {
            tool_calls: Some(vec![ToolCallDelta {
                index,
                id: id.map(Into::into),
                function: Some(FunctionDelta {
                    name: name.map(Into::into),
                    arguments: arguments.map(Into::into),
                }),
            }]),
            ..Default::default()
        })
    }

    pub fn from_delta(delta: Delta) -> Self {
        Self {
            choices: vec![StreamChoice {
                index: 0,
                delta: Some(delta),
            }],
        }
    }
}
