use super::notifier::{LogEntry, LogLevel, Notifier, NotifyError};
use super::{ChannelBinding, IncomingPost, Ledger, LedgerKey, Outcome, Participant, Rejection};
use super::{resolver, validator};
use crate::catalog::Catalog;
use crate::reports::roster::RosterCache;
use crate::sheets::{PresenceRow, PresenceStore, StoreError};
use crate::utils::time::{format_sheet_day, format_sheet_time, to_local};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresencePolicy {
    /// Credit the first mentioned user and reject posts without a mention.
    pub require_mention: bool,
    /// Tell the author when a post lands outside every window instead of ignoring it.
    pub notify_outside_window: bool,
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self {
            require_mention: true,
            notify_outside_window: false,
        }
    }
}

/// Turns presence posts into sheet rows, one credit per subject, event and channel per day.
pub struct PresenceRecorder {
    catalog: Arc<Catalog>,
    bindings: HashMap<u64, ChannelBinding>,
    ledger: Arc<Ledger>,
    store: Arc<dyn PresenceStore>,
    notifier: Arc<dyn Notifier>,
    roster: Arc<RosterCache>,
    policy: PresencePolicy,
    tz: Tz,
}

impl PresenceRecorder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        bindings: Vec<ChannelBinding>,
        ledger: Arc<Ledger>,
        store: Arc<dyn PresenceStore>,
        notifier: Arc<dyn Notifier>,
        roster: Arc<RosterCache>,
        policy: PresencePolicy,
        tz: Tz,
    ) -> Self {
        Self {
            catalog,
            bindings: bindings.into_iter().map(|b| (b.channel_id, b)).collect(),
            ledger,
            store,
            notifier,
            roster,
            policy,
            tz,
        }
    }

    pub fn is_monitored(&self, channel_id: u64) -> bool {
        self.bindings.contains_key(&channel_id)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub async fn handle(&self, post: &IncomingPost) -> Outcome {
        let Some(binding) = self.bindings.get(&post.channel_id) else {
            return Outcome::Ignored;
        };
        let Some(division) = self.catalog.division(&binding.division_key) else {
            return Outcome::Ignored;
        };

        let local = to_local(post.timestamp, self.tz);

        let Some(event) = resolver::resolve(
            &self.catalog,
            &binding.division_key,
            &binding.category,
            post.timestamp,
            self.tz,
        ) else {
            if !self.policy.notify_outside_window {
                debug!("Post {} in channel {} is outside every window", post.message_id, post.channel_id);
                return Outcome::Ignored;
            }
            let rejection = Rejection::OutsideWindow {
                local_time: local.format("%H:%M").to_string(),
            };
            self.reject(post, &rejection).await;
            return Outcome::Rejected(rejection);
        };

        let subject = match validator::validate(post, self.policy.require_mention) {
            Ok(subject) => subject,
            Err(rejection) => {
                self.reject(post, &rejection).await;
                return Outcome::Rejected(rejection);
            }
        };

        let key = LedgerKey::new(subject.id, event.name.clone(), post.channel_id);
        if !self.ledger.try_reserve(&key) {
            self.duplicate(post, &subject, &event.name).await;
            return Outcome::Duplicate(event.name.clone());
        }

        info!("Processing presence for '{}' in event '{}'", subject.display_name, event.name);

        let row = PresenceRow {
            day: format_sheet_day(&local),
            event: event.name.clone(),
            time: format_sheet_time(&local),
            nickname: subject.display_name.clone(),
        };

        if let Err(e) = self.store.append_record(&division.sheet_target, &row).await {
            self.ledger.release(&key);
            debug!(
                "Released reservation for subject {} in event '{}' (channel {})",
                key.subject_id(),
                key.event_name(),
                key.channel_id()
            );
            self.external_failure(post, &subject, &event.name, &division.sheet_target, e)
                .await;
            return Outcome::ExternalFailure;
        }
        self.ledger.confirm(&key);

        if let Err(e) = self
            .notifier
            .add_acknowledgment(post.channel_id, post.message_id)
            .await
        {
            warn!("Failed to react to message {}: {}", post.message_id, e);
        }

        self.roster.add(&division.sheet_target, &subject.display_name);

        self.notifier
            .log_event(LogEntry::new(
                LogLevel::Success,
                "✅ Presença Registrada com Sucesso",
                format!(
                    "**Jogador:** {}\n**Evento:** {}\n**Divisão:** {}\n**Registrado por:** <@{}>",
                    subject.display_name, event.name, division.sheet_target, post.author.id
                ),
            ))
            .await;

        Outcome::Recorded(event.name.clone())
    }

    async fn reject(&self, post: &IncomingPost, rejection: &Rejection) {
        info!(
            "Rejected post {} from {}: {}",
            post.message_id,
            post.author.id,
            rejection.label()
        );

        self.notify_author(post, &rejection.reason()).await;

        let title = match rejection {
            Rejection::MissingImage => "⚠️ Post Ignorado: Sem Imagem",
            Rejection::MissingMention => "⚠️ Post Ignorado: Sem Menção",
            Rejection::OutsideWindow { .. } => "⚠️ Post Ignorado: Fora do Horário",
        };
        self.notifier
            .log_event(LogEntry::new(
                LogLevel::Warning,
                title,
                format!(
                    "**Autor:** <@{}>\n**Canal:** <#{}>\n**Motivo:** {}",
                    post.author.id,
                    post.channel_id,
                    rejection.reason()
                ),
            ))
            .await;
    }

    async fn duplicate(&self, post: &IncomingPost, subject: &Participant, event_name: &str) {
        info!(
            "Duplicate presence for '{}' in event '{}' (channel {})",
            subject.display_name, event_name, post.channel_id
        );

        self.notify_author(
            post,
            &format!(
                "A presença para '{}' no evento '{}' já foi registrada hoje.",
                subject.display_name, event_name
            ),
        )
        .await;

        self.notifier
            .log_event(LogEntry::new(
                LogLevel::Failure,
                "❌ Post Ignorado: Duplicado",
                format!(
                    "**Autor:** <@{}>\n**Jogador Mencionado:** <@{}>\n**Evento:** {}\n**Canal:** <#{}>",
                    post.author.id, subject.id, event_name, post.channel_id
                ),
            ))
            .await;
    }

    async fn external_failure(
        &self,
        post: &IncomingPost,
        subject: &Participant,
        event_name: &str,
        target: &str,
        e: StoreError,
    ) {
        match &e {
            StoreError::TargetNotFound(_) => error!(
                "Sheet target '{}' not found; check the division configuration and sharing settings",
                target
            ),
            StoreError::Transient(reason) => error!(
                "Failed to write presence for '{}' to '{}': {}",
                subject.display_name, target, reason
            ),
        }

        self.notify_author(
            post,
            "Não foi possível gravar a presença na planilha agora. Tente postar novamente em alguns minutos.",
        )
        .await;

        self.notifier
            .log_event(LogEntry::new(
                LogLevel::Failure,
                "❌ Falha ao Registrar Presença",
                format!(
                    "**Jogador:** {}\n**Evento:** {}\n**Divisão:** {}\n**Erro:** {}",
                    subject.display_name, event_name, target, e
                ),
            ))
            .await;
    }

    async fn notify_author(&self, post: &IncomingPost, reason: &str) {
        let text = format!(
            "Olá! Sua postagem no canal <#{}> não pôde ser registrada. Motivo: {}",
            post.channel_id, reason
        );
        match self.notifier.send_direct_message(post.author.id, &text).await {
            Ok(()) => {}
            Err(NotifyError::Forbidden) => {
                debug!("User {} does not accept direct messages", post.author.id)
            }
            Err(e) => warn!("Failed to send direct message to {}: {}", post.author.id, e),
        }
    }
}
