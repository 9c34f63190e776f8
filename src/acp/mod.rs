pub mod bridge;
pub mod client;
pub mod dispatcher;
pub mod fragment;
pub mod metrics;
pub mod schema;
pub mod subscriber;
pub mod tool_kind;
pub mod tracker;

pub use bridge::ThreadBridge;
pub use client::{Client, DebugLogClient, NdjsonClient};
pub use dispatcher::{ErrorPolicy, EventDispatcher};
pub use schema::{SessionNotification, SessionUpdate};
pub use subscriber::EventSubscriber;
