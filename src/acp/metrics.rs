use serde::{Deserialize, Serialize};

use crate::core::stats::{ConversationStats, TokenUsage};

/// Structured metrics attached to notifications under `<namespace>/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPayload {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub reasoning_tokens: u64,
    pub cost: f64,
    pub status_line: String,
}

/// One segment of the status line, so callers can style segments separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Input,
    CacheHit,
    Reasoning,
    Output,
    Cost,
}

const SEPARATOR: &str = " • ";

/// `1500` -> `1.5K`, `2_000_000` -> `2M`, values below 1000 unchanged.
pub fn abbreviate(n: u64) -> String {
    let (value, suffix) = if n >= 1_000_000_000 {
        (n as f64 / 1_000_000_000.0, "B")
    } else if n >= 1_000_000 {
        (n as f64 / 1_000_000.0, "M")
    } else if n >= 1_000 {
        (n as f64 / 1_000.0, "K")
    } else {
        return n.to_string();
    };
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{suffix}")
}

pub fn cache_hit_rate(usage: &TokenUsage) -> String {
    if usage.prompt_tokens == 0 {
        return "N/A".into();
    }
    let rate = usage.cache_read_tokens as f64 / usage.prompt_tokens as f64 * 100.0;
    format!("{rate:.2}%")
}

pub fn format_cost(cost: f64) -> String {
    if cost > 0.0 {
        format!("{cost:.4}")
    } else {
        "0.00".into()
    }
}

/// Status line segments in display order; reasoning is left out when zero.
pub fn status_fields(usage: &TokenUsage, cost: f64) -> Vec<(StatusField, String)> {
    let mut fields = vec![
        (
            StatusField::Input,
            format!("↑ input {}", abbreviate(usage.prompt_tokens)),
        ),
        (
            StatusField::CacheHit,
            format!("cache hit {}", cache_hit_rate(usage)),
        ),
    ];
    if usage.reasoning_tokens > 0 {
        fields.push((
            StatusField::Reasoning,
            format!("reasoning {}", abbreviate(usage.reasoning_tokens)),
        ));
    }
    fields.push((
        StatusField::Output,
        format!("↓ output {}", abbreviate(usage.completion_tokens)),
    ));
    fields.push((StatusField::Cost, format!("$ {}", format_cost(cost))));
    fields
}

pub fn format_status_line(usage: &TokenUsage, cost: f64) -> String {
    status_fields(usage, cost)
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn format(usage: &TokenUsage, cost: f64) -> (String, MetricsPayload) {
    let status_line = format_status_line(usage, cost);
    let payload = MetricsPayload {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        cache_read_tokens: usage.cache_read_tokens,
        reasoning_tokens: usage.reasoning_tokens,
        cost,
        status_line: status_line.clone(),
    };
    (status_line, payload)
}

/// `_meta` object for a notification, or `None` when no usage is known yet.
pub fn metrics_meta(
    metrics_key: &str,
    stats: Option<&dyn ConversationStats>,
) -> Option<serde_json::Value> {
    let snapshot = stats?.combined_metrics()?;
    let usage = snapshot.accumulated_token_usage?;
    let (_, payload) = format(&usage, snapshot.accumulated_cost);
    let payload = serde_json::to_value(payload).ok()?;

    let mut meta = serde_json::Map::new();
    meta.insert(metrics_key.to_string(), payload);
    Some(serde_json::Value::Object(meta))
}
