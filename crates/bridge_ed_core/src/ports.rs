//! crates/bridge_ed_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the local
//! key-value store or the generative-language-model collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::{ChatMessage, Exercise, GradeResult, Language};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., filesystem, collaborator API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Persisted data exists but cannot be decoded. Callers recover locally
    /// by treating the data as absent; this variant is never fatal.
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
    /// A collaborator round trip failed or returned an unusable payload.
    /// The triggering operation stays retryable and commits no state.
    #[error("Collaborator request failed: {0}")]
    Collaborator(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The local key-value store that simulates durable persistence.
/// Values are JSON strings under fixed keys.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translates `text` into the target language. Implementations fall back
    /// to the source text when the collaborator returns an empty response.
    async fn translate(&self, text: &str, target: Language) -> PortResult<String>;
}

#[async_trait]
pub trait ExerciseGenerationService: Send + Sync {
    /// Generates one practice exercise for a course. The returned exercise
    /// has passed `Exercise::validate`.
    async fn generate_exercise(
        &self,
        course_title: &str,
        course_description: &str,
        lang: Language,
    ) -> PortResult<Exercise>;
}

#[async_trait]
pub trait GradingService: Send + Sync {
    /// Grades a candidate answer against the exercise.
    async fn evaluate_exercise(
        &self,
        exercise: &Exercise,
        answer: &str,
        lang: Language,
    ) -> PortResult<GradeResult>;
}

#[async_trait]
pub trait TutoringService: Send + Sync {
    /// Produces the tutor's reply to the full ordered conversation history.
    /// Implementations fall back to a fixed apology string when the
    /// collaborator returns an empty response.
    async fn tutor_reply(&self, history: &[ChatMessage], lang: Language) -> PortResult<String>;
}

/// Time source and delay provider. Injected so that simulated network
/// latency and message timestamps are deterministic under test.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}
