pub mod client;
pub mod config;
pub mod state;
pub mod telemetry;
pub mod widget;

// Re-export main types for convenience
pub use client::{AskBackend, AskClient, AskError};
pub use config::Config;
pub use state::{ChatMessage, ChatRole, Status};
pub use widget::{ChatWidget, FALLBACK_MESSAGE, GREETING};
