//! services/app/src/adapters/grading_llm.rs
//!
//! This module contains the adapter for the answer-grading LLM.
//! It implements the `GradingService` port from the `core` crate.

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
    domain::{Exercise, GradeResult, Language},
    ports::{GradingService, PortError, PortResult},
};
use serde::Deserialize;

const SYSTEM_INSTRUCTIONS: &str = r#"You grade a learner's answer to an academic exercise.

Respond with a single JSON object and nothing else. Keys:
- "score": number from 0 to 100.
- "feedback": string with detailed pedagogical feedback, written in the requested language.
- "is_correct": boolean.

When the exercise carries a reference answer, grade against it. Otherwise judge the answer on accuracy, depth and reasoning."#;

//=========================================================================================
// Raw Collaborator Payload
//=========================================================================================

#[derive(Debug, Deserialize)]
struct GradePayload {
    score: f64,
    feedback: String,
    is_correct: bool,
}

impl GradePayload {
    fn into_domain(self) -> GradeResult {
        GradeResult {
            // The collaborator occasionally strays outside the range.
            score: self.score.clamp(0.0, 100.0).round() as u8,
            feedback: self.feedback,
            is_correct: self.is_correct,
            metadata: None,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GradingService` using an OpenAI-compatible
/// LLM.
#[derive(Clone)]
pub struct OpenAiGradingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGradingAdapter {
    /// Creates a new `OpenAiGradingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `GradingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GradingService for OpenAiGradingAdapter {
    async fn evaluate_exercise(
        &self,
        exercise: &Exercise,
        answer: &str,
        lang: Language,
    ) -> PortResult<GradeResult> {
        let mut prompt = format!(
            "Evaluate this answer for the exercise:\nQ: {}\nUser Answer: {}\n",
            exercise.question, answer
        );
        if let Some(reference) = &exercise.correct_answer {
            prompt.push_str(&format!("Reference Answer: {}\n", reference));
        }
        prompt.push_str(&format!(
            "\nProvide a score (0-100) and detailed pedagogical feedback in {}.",
            lang
        ));

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
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
                PortError::Collaborator("Grading returned no text content.".to_string())
            })?;

        let payload: GradePayload = serde_json::from_str(&content)
            .map_err(|e| PortError::Collaborator(format!("unparseable grade payload: {e}")))?;
        Ok(payload.into_domain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_scores_are_clamped() {
        let high = GradePayload {
            score: 240.0,
            feedback: "f".to_string(),
            is_correct: true,
        };
        assert_eq!(high.into_domain().score, 100);

        let low = GradePayload {
            score: -3.0,
            feedback: "f".to_string(),
            is_correct: false,
        };
        assert_eq!(low.into_domain().score, 0);
    }
}
