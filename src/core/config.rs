use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;

/// Namespace used for the metrics side-channel key (`<namespace>/metrics`)
const DEFAULT_METRICS_NAMESPACE: &str = "octo-code.dev";

const GLOBAL_CONFIG_DIR: &str = "octo-acp";
const CONFIG_FILE_NAME: &str = "config.json";
const LOCAL_CONFIG_FILE_NAME: &str = "octo-acp.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Token streaming is on; complete assistant messages are then suppressed
    #[serde(default = "default_streaming_enabled")]
    pub streaming_enabled: bool,

    #[serde(default = "default_metrics_namespace")]
    pub metrics_namespace: String,

    /// Bound of the channel between the agent worker and the connection task
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub debug: bool,

    /// Append every outgoing notification to a JSONL file
    #[serde(default)]
    pub debug_log: bool,

    #[serde(default)]
    pub debug_log_dir: Option<PathBuf>,
}

fn default_streaming_enabled() -> bool {
    true
}

fn default_metrics_namespace() -> String {
    DEFAULT_METRICS_NAMESPACE.into()
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            streaming_enabled: default_streaming_enabled(),
            metrics_namespace: default_metrics_namespace(),
            channel_capacity: default_channel_capacity(),
            debug: false,
            debug_log: false,
            debug_log_dir: None,
        }
    }
}

impl BridgeConfig {
    pub fn metrics_key(&self) -> String {
        metrics_key(&self.metrics_namespace)
    }

    /// Directory for protocol debug logs, falling back to the user data dir
    pub fn resolved_debug_log_dir(&self) -> PathBuf {
        self.debug_log_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(GLOBAL_CONFIG_DIR)
                .join("acp-debug")
        })
    }
}

pub fn metrics_key(namespace: &str) -> String {
    format!("{namespace}/metrics")
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<BridgeConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = BridgeConfig::default();

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join(GLOBAL_CONFIG_DIR).join(CONFIG_FILE_NAME);
        if global_path.exists() {
            merge_config(&mut config, read_config_file(&global_path)?);
        }
    }

    let local_path = wd.join(LOCAL_CONFIG_FILE_NAME);
    if local_path.exists() {
        merge_config(&mut config, read_config_file(&local_path)?);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::File(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Overlay fields win only when they differ from the defaults.
pub fn merge_config(base: &mut BridgeConfig, overlay: BridgeConfig) {
    if overlay.streaming_enabled != default_streaming_enabled() {
        base.streaming_enabled = overlay.streaming_enabled;
    }
    if overlay.metrics_namespace != default_metrics_namespace() {
        base.metrics_namespace = overlay.metrics_namespace;
    }
    if overlay.channel_capacity != default_channel_capacity() {
        base.channel_capacity = overlay.channel_capacity;
    }
    if overlay.debug {
        base.debug = true;
    }
    if overlay.debug_log {
        base.debug_log = true;
    }
    if overlay.debug_log_dir.is_some() {
        base.debug_log_dir = overlay.debug_log_dir;
    }
}

pub(crate) fn apply_env_overrides(
    config: &mut BridgeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("OCTO_ACP_STREAMING").and_then(|v| parse_flag(&v)) {
        config.streaming_enabled = v;
    }
    if let Some(v) = lookup("OCTO_ACP_DEBUG_LOG").and_then(|v| parse_flag(&v)) {
        config.debug_log = v;
    }
    if let Some(ns) = lookup("OCTO_ACP_METRICS_NAMESPACE") {
        if !ns.is_empty() {
            config.metrics_namespace = ns;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
