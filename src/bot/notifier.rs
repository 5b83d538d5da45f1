use crate::presence::notifier::{LogEntry, NotifyError, Notifier};
use crate::utils::format::create_log_embed;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Discord implementation of the outbound notification capability.
pub struct DiscordNotifier {
    http: Arc<serenity::Http>,
    log_channel: Option<serenity::ChannelId>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<serenity::Http>, log_channel_id: Option<u64>) -> Self {
        if log_channel_id.is_none() {
            tracing::warn!("No LOG_CHANNEL_ID configured; audit messages will only go to the console");
        }
        Self {
            http,
            log_channel: log_channel_id.map(serenity::ChannelId::new),
        }
    }
}

fn classify(e: ::serenity::Error) -> NotifyError {
    if let ::serenity::Error::Http(::serenity::http::HttpError::UnsuccessfulRequest(response)) = &e {
        if response.status_code.as_u16() == 403 {
            return NotifyError::Forbidden;
        }
    }
    NotifyError::Failed(e.to_string())
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send_direct_message(&self, user_id: u64, text: &str) -> Result<(), NotifyError> {
        serenity::UserId::new(user_id)
            .direct_message(self.http.as_ref(), serenity::CreateMessage::new().content(text))
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn add_acknowledgment(&self, channel_id: u64, message_id: u64) -> Result<(), NotifyError> {
        serenity::ChannelId::new(channel_id)
            .create_reaction(
                self.http.as_ref(),
                serenity::MessageId::new(message_id),
                serenity::ReactionType::Unicode("✅".to_string()),
            )
            .await
            .map_err(classify)
    }

    async fn log_event(&self, entry: LogEntry) {
        let Some(channel) = self.log_channel else {
            tracing::debug!("Log channel not configured: {} - {}", entry.title, entry.description);
            return;
        };

        let message = serenity::CreateMessage::new().embed(create_log_embed(&entry));
        match channel.send_message(self.http.as_ref(), message).await {
            Ok(_) => {}
            Err(e) => match classify(e) {
                NotifyError::Forbidden => {
                    tracing::error!("Missing permission to post in log channel {}", channel)
                }
                other => tracing::error!("Failed to send message to log channel: {}", other),
            },
        }
    }
}
