pub mod clock;
pub mod exercise_llm;
pub mod grading_llm;
pub mod store;
pub mod translate_llm;
pub mod tutor_llm;

pub use clock::TokioClock;
pub use exercise_llm::OpenAiExerciseAdapter;
pub use grading_llm::OpenAiGradingAdapter;
pub use store::{JsonFileStore, MemoryStore};
pub use translate_llm::OpenAiTranslationAdapter;
pub use tutor_llm::OpenAiTutorAdapter;

/// Returns the trimmed collaborator text, or the fallback when the response
/// came back empty. Translation and tutoring degrade this way instead of
/// erroring.
pub(crate) fn text_or_fallback(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
