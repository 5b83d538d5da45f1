pub mod ledger;
pub mod notifier;
pub mod recorder;
pub mod resolver;
pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use ledger::Ledger;
pub use recorder::{PresencePolicy, PresenceRecorder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: u64,
    pub display_name: String,
}

/// A chat message (new or edited) as seen by the recorder.
#[derive(Debug, Clone)]
pub struct IncomingPost {
    pub message_id: u64,
    pub channel_id: u64,
    pub author: Participant,
    pub mentions: Vec<Participant>,
    pub attachment_content_types: Vec<Option<String>>,
    pub timestamp: DateTime<Utc>,
}

/// Binds a monitored channel to the division and catalog category it reports for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBinding {
    pub channel_id: u64,
    pub division_key: String,
    pub category: String,
}

/// One subject's credit for one event in one channel since the last daily reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey(pub u64, pub String, pub u64);

impl LedgerKey {
    pub fn new(subject_id: u64, event_name: impl Into<String>, channel_id: u64) -> Self {
        Self(subject_id, event_name.into(), channel_id)
    }

    pub fn subject_id(&self) -> u64 {
        self.0
    }

    pub fn event_name(&self) -> &str {
        &self.1
    }

    pub fn channel_id(&self) -> u64 {
        self.2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingImage,
    MissingMention,
    /// Posted while no event window was open; `local_time` is `HH:MM`.
    OutsideWindow { local_time: String },
}

impl Rejection {
    pub fn reason(&self) -> String {
        match self {
            Rejection::MissingImage => {
                "Você precisa enviar uma mensagem com uma imagem (print) para registrar a presença."
                    .to_string()
            }
            Rejection::MissingMention => {
                "Você precisa marcar o usuário (@nick) que está recebendo a presença na mensagem."
                    .to_string()
            }
            Rejection::OutsideWindow { local_time } => format!(
                "Sua postagem às {} está fora do horário de qualquer evento ativo.",
                local_time
            ),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MissingImage => "missing image",
            Rejection::MissingMention => "missing mention",
            Rejection::OutsideWindow { .. } => "outside window",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Rejected(Rejection),
    Duplicate(String),
    Recorded(String),
    ExternalFailure,
}
