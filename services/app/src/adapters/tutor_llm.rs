//! services/app/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the tutoring LLM.
//! It implements the `TutoringService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use bridge_ed_core::{
    domain::{ChatMessage, ChatRole, Language},
    ports::{PortError, PortResult, TutoringService},
};

use crate::adapters::text_or_fallback;

/// Shown when the collaborator returns an empty reply.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TutoringService` using an OpenAI-compatible
/// LLM.
#[derive(Clone)]
pub struct OpenAiTutorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTutorAdapter {
    /// Creates a new `OpenAiTutorAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn system_instructions(lang: Language) -> String {
        format!(
            "You are BridgeEd's Multilingual AI Tutor.\n\
             Current language: {lang}.\n\
             If context is Western: focus on critical thinking and project collaboration.\n\
             If context is Arab World: focus on scientific rigor within cultural values.\n\
             Answer in {lang}."
        )
    }
}

//=========================================================================================
// `TutoringService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TutoringService for OpenAiTutorAdapter {
    /// Produces a tutor reply from the full ordered conversation history.
    async fn tutor_reply(&self, history: &[ChatMessage], lang: Language) -> PortResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(history.len() + 1);
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Self::system_instructions(lang))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );
        for turn in history {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
                ChatRole::Model => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Collaborator(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(text_or_fallback(&content, FALLBACK_REPLY))
    }
}
