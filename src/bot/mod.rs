pub mod bindings;
pub mod commands;
pub mod handlers;
pub mod notifier;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::presence::{Ledger, PresencePolicy, PresenceRecorder};
use crate::reports::roster::RosterCache;
use crate::scheduler::{self, Housekeeping};
use crate::sheets::PresenceStore;
use anyhow::Result;
use notifier::DiscordNotifier;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub catalog: Arc<Catalog>,
    pub recorder: Arc<PresenceRecorder>,
    pub store: Arc<dyn PresenceStore>,
    pub roster: Arc<RosterCache>,
    pub config: Config,
}

pub async fn create_bot(
    config: Config,
    catalog: Arc<Catalog>,
    ledger: Arc<Ledger>,
    store: Arc<dyn PresenceStore>,
) -> Result<serenity::Client> {
    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;
    let token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::reports::player(), commands::reports::rankings()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let guild_id = match config.guild_id {
                    Some(id) => serenity::GuildId::new(id),
                    None => match ready.guilds.first() {
                        Some(guild) => guild.id,
                        None => {
                            tracing::error!("Bot is not a member of any guild; no channel will be monitored");
                            return Err(Error::from("no guild available for channel binding"));
                        }
                    },
                };

                let bindings = bindings::bind_guild(ctx, guild_id, &catalog).await?;
                let notifier = Arc::new(DiscordNotifier::new(ctx.http.clone(), config.log_channel_id));
                let roster = Arc::new(RosterCache::default());

                let policy = PresencePolicy {
                    require_mention: config.require_mention,
                    notify_outside_window: config.notify_outside_window,
                };
                let recorder = Arc::new(PresenceRecorder::new(
                    catalog.clone(),
                    bindings,
                    ledger.clone(),
                    store.clone(),
                    notifier,
                    roster.clone(),
                    policy,
                    config.timezone,
                ));
                tracing::info!("Monitoring {} channels", recorder.binding_count());

                let targets = catalog.sheet_targets();
                roster.populate(store.as_ref(), &targets).await;

                let housekeeping = Housekeeping {
                    ledger: ledger.clone(),
                    roster: roster.clone(),
                    store: store.clone(),
                    targets,
                };
                scheduler::spawn_daily_reset(housekeeping.clone(), config.timezone, config.daily_reset_time);
                scheduler::spawn_snapshots(housekeeping, Duration::from_secs(config.snapshot_interval_secs));

                Ok(Data {
                    catalog,
                    recorder,
                    store,
                    roster,
                    config,
                })
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
