use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Token counts accumulated over a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub cache_read_tokens: u64,
    #[serde(default)]
    pub reasoning_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.reasoning_tokens += other.reasoning_tokens;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub accumulated_token_usage: Option<TokenUsage>,
    #[serde(default)]
    pub accumulated_cost: f64,
}

/// Read access to the agent's running usage and cost totals.
pub trait ConversationStats: Send + Sync {
    fn combined_metrics(&self) -> Option<MetricsSnapshot>;
}

/// In-process stats store shared between the agent side and the bridge.
#[derive(Debug, Clone, Default)]
pub struct SharedStats {
    inner: Arc<RwLock<MetricsSnapshot>>,
}

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: &TokenUsage, cost: f64) {
        let mut snapshot = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        snapshot
            .accumulated_token_usage
            .get_or_insert_with(TokenUsage::default)
            .add(usage);
        snapshot.accumulated_cost += cost;
    }
}

impl ConversationStats for SharedStats {
    fn combined_metrics(&self) -> Option<MetricsSnapshot> {
        self.inner.read().ok().map(|s| s.clone())
    }
}
