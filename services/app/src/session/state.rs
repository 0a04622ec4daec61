//! services/app/src/session/state.rs
//!
//! Defines the application's shared service bundle.

use crate::config::Config;
use bridge_ed_core::ports::{
    Clock, ExerciseGenerationService, GradingService, StorageService, TranslationService,
    TutoringService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across the Whole Process)
//=========================================================================================

/// The shared application state, created once at startup and handed by
/// reference to the view layer and the session services. Nothing in here is
/// a module-level singleton; tests build their own bundle with stub ports.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn StorageService>,
    pub clock: Arc<dyn Clock>,
    pub exercise_adapter: Arc<dyn ExerciseGenerationService>,
    pub grading_adapter: Arc<dyn GradingService>,
    pub tutor_adapter: Arc<dyn TutoringService>,
    pub translation_adapter: Arc<dyn TranslationService>,
}
