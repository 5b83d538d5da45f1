use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The user does not accept direct messages from the bot.
    #[error("direct messages are closed")]
    Forbidden,
    #[error("notification failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Success,
    Warning,
    Failure,
}

/// Audit entry mirrored to the log channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub title: String,
    pub description: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_direct_message(&self, user_id: u64, text: &str) -> Result<(), NotifyError>;

    async fn add_acknowledgment(&self, channel_id: u64, message_id: u64) -> Result<(), NotifyError>;

    /// Best effort; implementations log their own failures.
    async fn log_event(&self, entry: LogEntry);
}
