//! services/app/src/session/gateway.rs
//!
//! The service gateway in front of the generation/grading collaborator.
//! It fabricates per-service latency through the injected clock, measures the
//! round trip with the same clock, and stamps grading responses with
//! latency/size metadata. The health table it exposes is simulation data for
//! the dashboard, not real telemetry.

use crate::session::state::AppState;
use bridge_ed_core::domain::{
    Course, Exercise, GradeMetadata, GradeResult, Language, ServiceState, ServiceStatus,
};
use bridge_ed_core::ports::{
    Clock, ExerciseGenerationService, GradingService, PortResult,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CONTENT_SVC: &str = "Content-Gen";
const GRADING_SVC: &str = "Grading-Svc";

fn default_health() -> Vec<ServiceStatus> {
    let row = |name: &str, latency_ms: u64| ServiceStatus {
        name: name.to_string(),
        status: ServiceState::Online,
        latency_ms,
    };
    vec![
        row("Learner-Svc", 45),
        row(CONTENT_SVC, 120),
        row(GRADING_SVC, 85),
        row("Auth-Edge", 12),
    ]
}

//=========================================================================================
// Gateway
//=========================================================================================

/// Orchestrates exercise generation and grading round trips. Explicitly
/// constructed and passed by handle; there is no process-wide instance.
pub struct Gateway {
    exercise: Arc<dyn ExerciseGenerationService>,
    grading: Arc<dyn GradingService>,
    clock: Arc<dyn Clock>,
    latency_enabled: bool,
    health: Vec<ServiceStatus>,
}

impl Gateway {
    pub fn new(
        exercise: Arc<dyn ExerciseGenerationService>,
        grading: Arc<dyn GradingService>,
        clock: Arc<dyn Clock>,
        latency_enabled: bool,
    ) -> Self {
        Self {
            exercise,
            grading,
            clock,
            latency_enabled,
            health: default_health(),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.exercise_adapter.clone(),
            state.grading_adapter.clone(),
            state.clock.clone(),
            state.config.simulate_latency,
        )
    }

    /// The simulated health dashboard rows.
    pub fn health(&self) -> &[ServiceStatus] {
        &self.health
    }

    /// Sleeps the service's fabricated latency (base plus jitter) and
    /// returns the elapsed time as measured by the injected clock.
    async fn simulate_latency(&self, service: &str) -> u64 {
        let base = self
            .health
            .iter()
            .find(|s| s.name == service)
            .map(|s| s.latency_ms)
            .unwrap_or(100);
        let jitter: u64 = rand::rng().random_range(0..50);

        let started = self.clock.now();
        if self.latency_enabled {
            self.clock.sleep(Duration::from_millis(base + jitter)).await;
        }
        (self.clock.now() - started).num_milliseconds().max(0) as u64
    }

    /// Fetches one generated exercise for the course in the given language.
    pub async fn fetch_personalized_exercise(
        &self,
        course: &Course,
        lang: Language,
    ) -> PortResult<Exercise> {
        let elapsed = self.simulate_latency(CONTENT_SVC).await;
        debug!(course = %course.id, "exercise fetched in {elapsed}ms");
        self.exercise
            .generate_exercise(course.title.get(lang), course.description.get(lang), lang)
            .await
    }

    /// Grades a candidate answer and stamps the result with latency/size
    /// metadata.
    pub async fn submit_grading(
        &self,
        exercise: &Exercise,
        answer: &str,
        lang: Language,
    ) -> PortResult<GradeResult> {
        let elapsed = self.simulate_latency(GRADING_SVC).await;
        let mut result = self.grading.evaluate_exercise(exercise, answer, lang).await?;
        result.metadata = Some(GradeMetadata {
            processing_ms: elapsed,
            tokens: (answer.len() as f32 * 1.5) as u32,
        });
        Ok(result)
    }
}
