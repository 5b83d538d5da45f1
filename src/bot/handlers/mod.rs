use crate::bot::{Data, Error};
use crate::presence::{IncomingPost, Outcome, Participant};
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Bot logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            spawn_presence_task(ctx, new_message.clone(), data);
        }
        serenity::FullEvent::MessageUpdate { new, event, .. } => {
            let message = match new {
                Some(message) => message.clone(),
                None => match event.channel_id.message(&ctx.http, event.id).await {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("Could not fetch edited message {}: {:?}", event.id, e);
                        return Ok(());
                    }
                },
            };
            spawn_presence_task(ctx, message, data);
        }
        _ => {}
    }
    Ok(())
}

/// Runs the presence pipeline on its own task so slow chat or sheet calls never hold up
/// the gateway stream.
fn spawn_presence_task(ctx: &serenity::Context, message: serenity::Message, data: &Data) {
    if message.author.bot || !data.recorder.is_monitored(message.channel_id.get()) {
        return;
    }

    let ctx = ctx.clone();
    let recorder = data.recorder.clone();
    tokio::spawn(async move {
        let post = incoming_post(&ctx, &message).await;
        match recorder.handle(&post).await {
            Outcome::Ignored => {}
            outcome => tracing::debug!("Message {} -> {:?}", message.id, outcome),
        }
    });
}

fn fallback_name(user: &serenity::User) -> String {
    user.global_name.clone().unwrap_or_else(|| user.name.clone())
}

async fn incoming_post(ctx: &serenity::Context, message: &serenity::Message) -> IncomingPost {
    let author_name = message
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| fallback_name(&message.author));

    let mut mentions = Vec::with_capacity(message.mentions.len());
    for user in &message.mentions {
        let nick = match message.guild_id {
            Some(guild_id) => user.nick_in(ctx, guild_id).await,
            None => None,
        };
        mentions.push(Participant {
            id: user.id.get(),
            display_name: nick.unwrap_or_else(|| fallback_name(user)),
        });
    }

    let timestamp = DateTime::<Utc>::from_timestamp(message.timestamp.unix_timestamp(), 0)
        .unwrap_or_else(Utc::now);

    IncomingPost {
        message_id: message.id.get(),
        channel_id: message.channel_id.get(),
        author: Participant {
            id: message.author.id.get(),
            display_name: author_name,
        },
        mentions,
        attachment_content_types: message
            .attachments
            .iter()
            .map(|a| a.content_type.clone())
            .collect(),
        timestamp,
    }
}
