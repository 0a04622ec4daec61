//! services/app/src/adapters/exercise_llm.rs
//!
//! This module contains the adapter for the exercise-generating LLM.
//! It implements the `ExerciseGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use bridge_ed_core::{
    domain::{Exercise, ExerciseKind, Language},
    ports::{ExerciseGenerationService, PortError, PortResult},
};
use serde::Deserialize;
use uuid::Uuid;

const SYSTEM_INSTRUCTIONS: &str = r#"You generate one challenging academic practice exercise per request.

Respond with a single JSON object and nothing else. Keys:
- "question": string, the exercise prompt.
- "type": exactly "multiple-choice" or "open-ended".
- "options": array of 3-5 answer strings. Required when type is "multiple-choice", omit otherwise.
- "correct_answer": string, the correct option verbatim. Required when type is "multiple-choice", omit otherwise.

Write the question and all options in the requested language."#;

//=========================================================================================
// Raw Collaborator Payload
//=========================================================================================

/// The loosely-typed JSON shape the collaborator returns. It is validated
/// into the domain `Exercise` rather than trusted blindly.
#[derive(Debug, Deserialize)]
struct ExercisePayload {
    question: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_answer: Option<String>,
}

impl ExercisePayload {
    fn into_domain(self) -> PortResult<Exercise> {
        let kind = self
            .kind
            .parse::<ExerciseKind>()
            .map_err(|e| PortError::Collaborator(e.to_string()))?;
        let exercise = Exercise {
            id: Uuid::new_v4(),
            question: self.question,
            kind,
            options: self.options.filter(|o| !o.is_empty()),
            correct_answer: self.correct_answer,
        };
        exercise
            .validate()
            .map_err(|e| PortError::Collaborator(e.to_string()))?;
        Ok(exercise)
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ExerciseGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiExerciseAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiExerciseAdapter {
    /// Creates a new `OpenAiExerciseAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ExerciseGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ExerciseGenerationService for OpenAiExerciseAdapter {
    async fn generate_exercise(
        &self,
        course_title: &str,
        course_description: &str,
        lang: Language,
    ) -> PortResult<Exercise> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Generate an exercise for the course \"{}\" described as \"{}\". Respond in {}.",
                    course_title, course_description, lang
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
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
            .ok_or_else(|| {
                PortError::Collaborator(
                    "Exercise generation returned no text content.".to_string(),
                )
            })?;

        let payload: ExercisePayload = serde_json::from_str(&content).map_err(|e| {
            PortError::Collaborator(format!("unparseable exercise payload: {e}"))
        })?;
        payload.into_domain()
    }
}
