use thiserror::Error;

/// JSON-RPC code carried by [`AcpError::Internal`].
pub const INTERNAL_ERROR_CODE: i64 = -32603;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcpError {
    #[error("Internal error: {reason}: {details}")]
    Internal { reason: String, details: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AcpError {
    pub fn internal_error(reason: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
            details: details.into(),
        }
    }

    pub fn code(&self) -> i64 {
        INTERNAL_ERROR_CODE
    }

    /// JSON-RPC error object as it would appear on the wire.
    pub fn to_rpc_error(&self) -> serde_json::Value {
        let data = match self {
            Self::Internal { reason, details } => serde_json::json!({
                "reason": reason,
                "details": details,
            }),
            other => serde_json::json!({ "details": other.to_string() }),
        };
        serde_json::json!({
            "code": self.code(),
            "message": "Internal error",
            "data": data,
        })
    }
}

impl From<serde_json::Error> for AcpError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
