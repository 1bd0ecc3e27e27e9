//! UI-agnostic chat state types
//!
//! These types are shared between the widget controller and any front end
//! that renders it, and don't depend on a specific UI framework.

use serde::{Deserialize, Serialize};

/// A single bubble in the chat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Label shown above the bubble
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You:",
            ChatRole::Assistant => "Assistant:",
        }
    }
}

/// Transient status indicator shown while a question is being answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Thinking,
}

impl Status {
    pub fn text(&self) -> &'static str {
        match self {
            Status::Idle => "",
            Status::Thinking => "Thinking...",
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self, Status::Thinking)
    }
}
