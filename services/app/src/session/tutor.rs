//! services/app/src/session/tutor.rs
//!
//! The tutoring conversation log: an ordered, append-only sequence of chat
//! turns, persisted write-through under one key per language. Switching the
//! active language swaps the whole visible conversation; logs are never
//! merged across languages.

use bridge_ed_core::domain::{ChatMessage, ChatRole, Language};
use bridge_ed_core::ports::{Clock, PortError, PortResult, StorageService, TutoringService};
use std::sync::Arc;
use tracing::warn;

/// Storage keys are `bridge_ed_chat_<lang>`, one per language.
pub const CHAT_KEY_PREFIX: &str = "bridge_ed_chat_";

fn chat_key(lang: Language) -> String {
    format!("{CHAT_KEY_PREFIX}{lang}")
}

//=========================================================================================
// TutorLog
//=========================================================================================

pub struct TutorLog {
    store: Arc<dyn StorageService>,
    clock: Arc<dyn Clock>,
    lang: Language,
    messages: Vec<ChatMessage>,
}

impl TutorLog {
    /// Opens the log for a language, loading whatever is persisted for it.
    pub async fn open(
        store: Arc<dyn StorageService>,
        clock: Arc<dyn Clock>,
        lang: Language,
    ) -> PortResult<Self> {
        let mut log = Self {
            store,
            clock,
            lang,
            messages: Vec::new(),
        };
        log.load_for_language(lang).await?;
        Ok(log)
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Replaces the in-memory log with the persisted log for `lang`, or an
    /// empty log if none exists. A corrupt persisted log reads as empty.
    pub async fn load_for_language(&mut self, lang: Language) -> PortResult<()> {
        let messages = match self.store.get(&chat_key(lang)).await? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(lang = %lang, "persisted chat log is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
        };
        self.lang = lang;
        self.messages = messages;
        Ok(())
    }

    /// Appends a turn with a clock-generated timestamp and persists the full
    /// log immediately. The message only becomes visible once the write
    /// succeeded.
    pub async fn append(&mut self, role: ChatRole, text: &str) -> PortResult<()> {
        let message = ChatMessage {
            role,
            text: text.to_string(),
            timestamp: self.clock.now(),
        };
        let mut extended = self.messages.clone();
        extended.push(message);
        let raw = serde_json::to_string(&extended)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.put(&chat_key(self.lang), &raw).await?;
        self.messages = extended;
        Ok(())
    }

    /// Empties both the in-memory and the persisted log for the active
    /// language. The view layer is expected to have asked the user first.
    pub async fn clear(&mut self) -> PortResult<()> {
        self.store.remove(&chat_key(self.lang)).await?;
        self.messages.clear();
        Ok(())
    }

    /// Sends the full ordered history to the tutor and appends the reply as
    /// a model turn. On failure the log is left unchanged and the user can
    /// retry by resending.
    pub async fn request_reply(&mut self, tutor: &dyn TutoringService) -> PortResult<ChatMessage> {
        let reply = tutor.tutor_reply(&self.messages, self.lang).await?;
        self.append(ChatRole::Model, &reply).await?;
        // append just pushed the reply.
        self.messages
            .last()
            .cloned()
            .ok_or_else(|| PortError::Unexpected("appended reply vanished".to_string()))
    }
}
