//! services/app/src/session/practice.rs
//!
//! The short-lived state machine covering one practice attempt: fetch a
//! generated exercise, collect an answer, submit it for grading, display the
//! result, optionally advance to the next exercise.
//!
//! The session lives behind an `Arc<Mutex<_>>` handle and is driven by the
//! async task functions below. Each task flips state under the lock, releases
//! it across the collaborator await, and re-takes it to apply the outcome.
//! Completions are applied only when the session's epoch still matches the
//! request's, so a late response after the user navigated away is discarded
//! instead of landing on stale state.

use crate::session::gateway::Gateway;
use bridge_ed_core::domain::{Course, Exercise, GradeResult, Language, SubscriptionTier, User};
use bridge_ed_core::ports::PortError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

//=========================================================================================
// States, Outcomes and Errors
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeState {
    /// No exercise loaded (initial, or the last fetch failed).
    Loading,
    /// An exercise is held and an answer can be typed.
    Ready,
    /// The answer is with the grading service.
    Submitting,
    /// A grade result is held until the next exercise is fetched.
    Graded,
}

/// What a completed `start_practice` call did to the session.
#[derive(Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The exercise is loaded and the session is ready for an answer.
    Ready,
    /// The session moved on while the request was in flight; the response
    /// was dropped.
    Discarded,
}

/// What a completed `submit_answer` call did to the session.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A grade was applied. When `advance` is set the caller should record
    /// the practice result on the owning course.
    Graded { advance: bool },
    /// The session moved on while the request was in flight; the response
    /// was dropped.
    Discarded,
}

#[derive(Debug, thiserror::Error)]
pub enum PracticeError {
    #[error("a collaborator request is already in flight")]
    Busy,
    #[error("cannot submit an empty answer")]
    EmptyAnswer,
    #[error("practice requires an active enrollment in course '{0}'")]
    NotEnrolled(String),
    #[error("practice exercises are available on the pro tier only")]
    TierRestricted,
    #[error("course '{0}' does not belong to this practice session")]
    WrongCourse(String),
    #[error("operation is not valid in the {0:?} state")]
    InvalidState(PracticeState),
    #[error(transparent)]
    Port(#[from] PortError),
}

//=========================================================================================
// PracticeSession
//=========================================================================================

/// State for a single practice attempt. Exactly one exercise and at most one
/// in-flight collaborator request exist per instance.
pub struct PracticeSession {
    course_id: String,
    lang: Language,
    state: PracticeState,
    exercise: Option<Exercise>,
    answer: String,
    result: Option<GradeResult>,
    /// True while a collaborator request is in flight. A second `start` or
    /// `submit` during that window is rejected, never queued.
    pending: bool,
    /// Bumped by every `start` and by `invalidate`; completions carrying an
    /// older epoch are discarded.
    epoch: u64,
}

impl PracticeSession {
    /// Opens a practice session for an enrolled course. Practice is gated to
    /// the `pro` tier.
    pub fn begin(
        user: &User,
        course: &Course,
        lang: Language,
    ) -> Result<Arc<Mutex<Self>>, PracticeError> {
        if user.tier != SubscriptionTier::Pro {
            return Err(PracticeError::TierRestricted);
        }
        if !user.is_enrolled(&course.id) {
            return Err(PracticeError::NotEnrolled(course.id.clone()));
        }
        Ok(Arc::new(Mutex::new(Self {
            course_id: course.id.clone(),
            lang,
            state: PracticeState::Loading,
            exercise: None,
            answer: String::new(),
            result: None,
            pending: false,
            epoch: 0,
        })))
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn state(&self) -> PracticeState {
        self.state
    }

    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn result(&self) -> Option<&GradeResult> {
        self.result.as_ref()
    }

    /// Stores the candidate answer. Valid only in `Ready`; a no-op in every
    /// other state.
    pub fn set_answer(&mut self, text: &str) {
        if self.state == PracticeState::Ready {
            self.answer = text.to_string();
        }
    }

    /// Marks the session abandoned (the owning view navigated away). Any
    /// in-flight completion will be discarded when it arrives.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.pending = false;
    }
}

//=========================================================================================
// Session Task Functions
//=========================================================================================

/// Fetches a fresh exercise into the session. On failure the session stays
/// in `Loading` and a retry is another `start_practice` call.
pub async fn start_practice(
    handle: &Arc<Mutex<PracticeSession>>,
    gateway: &Gateway,
    course: &Course,
) -> Result<StartOutcome, PracticeError> {
    let (lang, epoch) = {
        let mut session = handle.lock().await;
        if session.course_id != course.id {
            return Err(PracticeError::WrongCourse(course.id.clone()));
        }
        if session.pending {
            return Err(PracticeError::Busy);
        }
        session.pending = true;
        session.epoch += 1;
        session.state = PracticeState::Loading;
        session.exercise = None;
        session.answer.clear();
        session.result = None;
        (session.lang, session.epoch)
    };

    let fetched = gateway.fetch_personalized_exercise(course, lang).await;

    let mut session = handle.lock().await;
    if session.epoch != epoch {
        warn!(course = %course.id, "discarding stale exercise response");
        return Ok(StartOutcome::Discarded);
    }
    session.pending = false;
    match fetched {
        Ok(exercise) => {
            info!(course = %course.id, exercise = %exercise.id, "exercise ready");
            session.exercise = Some(exercise);
            session.state = PracticeState::Ready;
            Ok(StartOutcome::Ready)
        }
        Err(e) => Err(e.into()),
    }
}

/// Submits the typed answer for grading. Rejected before any collaborator
/// contact when the answer is empty or a request is already in flight. On a
/// grading failure the session returns to `Ready` with the answer preserved
/// so the same submission can be retried.
pub async fn submit_answer(
    handle: &Arc<Mutex<PracticeSession>>,
    gateway: &Gateway,
) -> Result<SubmitOutcome, PracticeError> {
    let (exercise, answer, lang, epoch) = {
        let mut session = handle.lock().await;
        if session.pending {
            return Err(PracticeError::Busy);
        }
        if session.state != PracticeState::Ready {
            return Err(PracticeError::InvalidState(session.state));
        }
        if session.answer.trim().is_empty() {
            return Err(PracticeError::EmptyAnswer);
        }
        let exercise = session
            .exercise
            .clone()
            .ok_or(PracticeError::InvalidState(session.state))?;
        session.pending = true;
        session.state = PracticeState::Submitting;
        (exercise, session.answer.clone(), session.lang, session.epoch)
    };

    let graded = gateway.submit_grading(&exercise, &answer, lang).await;

    let mut session = handle.lock().await;
    if session.epoch != epoch {
        warn!(course = %session.course_id, "discarding stale grade response");
        return Ok(SubmitOutcome::Discarded);
    }
    session.pending = false;
    match graded {
        Ok(result) => {
            let advance = result.is_correct;
            info!(score = result.score, advance, "answer graded");
            session.result = Some(result);
            session.state = PracticeState::Graded;
            Ok(SubmitOutcome::Graded { advance })
        }
        Err(e) => {
            session.state = PracticeState::Ready;
            Err(e.into())
        }
    }
}

/// Advances to a fresh exercise. Valid only in `Graded`; clears the prior
/// grade by delegating to `start_practice`.
pub async fn next_exercise(
    handle: &Arc<Mutex<PracticeSession>>,
    gateway: &Gateway,
    course: &Course,
) -> Result<StartOutcome, PracticeError> {
    {
        let session = handle.lock().await;
        if session.pending {
            return Err(PracticeError::Busy);
        }
        if session.state != PracticeState::Graded {
            return Err(PracticeError::InvalidState(session.state));
        }
    }
    start_practice(handle, gateway, course).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        course, pro_user, BlockingGradingService, ManualClock, StubExerciseService,
        StubGradingService,
    };
    use std::sync::atomic::Ordering;

    fn gateway(
        exercise: Arc<StubExerciseService>,
        grading: Arc<dyn bridge_ed_core::ports::GradingService>,
    ) -> Gateway {
        Gateway::new(exercise, grading, Arc::new(ManualClock::new()), false)
    }

    fn ready_session(
        exercise_svc: &Arc<StubExerciseService>,
        grading: Arc<dyn bridge_ed_core::ports::GradingService>,
    ) -> (Arc<Mutex<PracticeSession>>, Gateway, Course) {
        let course = course("algebra");
        let user = pro_user(&["algebra"]);
        let handle = PracticeSession::begin(&user, &course, Language::En).unwrap();
        let gw = gateway(exercise_svc.clone(), grading);
        (handle, gw, course)
    }

    #[tokio::test]
    async fn practice_is_gated_to_the_pro_tier() {
        let course = course("algebra");
        let mut user = pro_user(&["algebra"]);
        user.tier = SubscriptionTier::Free;
        assert!(matches!(
            PracticeSession::begin(&user, &course, Language::En),
            Err(PracticeError::TierRestricted)
        ));
    }

    #[tokio::test]
    async fn practice_requires_enrollment() {
        let course = course("algebra");
        let user = pro_user(&[]);
        assert!(matches!(
            PracticeSession::begin(&user, &course, Language::En),
            Err(PracticeError::NotEnrolled(_))
        ));
    }

    #[tokio::test]
    async fn start_loads_an_exercise_and_clears_the_answer() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, gw, course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::correct(90)));

        let outcome = start_practice(&handle, &gw, &course).await.unwrap();
        assert_eq!(outcome, StartOutcome::Ready);

        let session = handle.lock().await;
        assert_eq!(session.state(), PracticeState::Ready);
        assert!(session.exercise().is_some());
        assert_eq!(session.answer(), "");
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn generation_failure_is_recoverable_by_retry() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, gw, course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::correct(90)));

        exercise_svc.fail.store(true, Ordering::SeqCst);
        let err = start_practice(&handle, &gw, &course).await.unwrap_err();
        assert!(matches!(err, PracticeError::Port(_)));
        assert_eq!(handle.lock().await.state(), PracticeState::Loading);

        exercise_svc.fail.store(false, Ordering::SeqCst);
        let outcome = start_practice(&handle, &gw, &course).await.unwrap();
        assert_eq!(outcome, StartOutcome::Ready);
    }

    #[tokio::test]
    async fn empty_answer_is_rejected_before_any_collaborator_call() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let grading = Arc::new(StubGradingService::correct(90));
        let (handle, gw, course) = ready_session(&exercise_svc, grading.clone());
        start_practice(&handle, &gw, &course).await.unwrap();

        let err = submit_answer(&handle, &gw).await.unwrap_err();
        assert!(matches!(err, PracticeError::EmptyAnswer));
        assert_eq!(grading.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn grading_failure_returns_to_ready_with_the_answer_preserved() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let grading = Arc::new(StubGradingService::correct(90));
        let (handle, gw, course) = ready_session(&exercise_svc, grading.clone());
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("the water cycle");

        grading.fail.store(true, Ordering::SeqCst);
        let err = submit_answer(&handle, &gw).await.unwrap_err();
        assert!(matches!(err, PracticeError::Port(_)));

        let session = handle.lock().await;
        assert_eq!(session.state(), PracticeState::Ready);
        assert_eq!(session.answer(), "the water cycle");
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn correct_answer_signals_the_caller_to_advance() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, gw, course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::correct(95)));
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("evaporation then condensation");

        let outcome = submit_answer(&handle, &gw).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Graded { advance: true });

        let session = handle.lock().await;
        assert_eq!(session.state(), PracticeState::Graded);
        let result = session.result().unwrap();
        assert_eq!(result.score, 95);
        assert!(result.metadata.is_some());
    }

    #[tokio::test]
    async fn incorrect_answer_does_not_signal_an_advance() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, gw, course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::incorrect(30)));
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("a guess");

        let outcome = submit_answer(&handle, &gw).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Graded { advance: false });
        assert_eq!(handle.lock().await.state(), PracticeState::Graded);
    }

    #[tokio::test]
    async fn next_clears_the_grade_and_issues_exactly_one_new_start() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, gw, course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::correct(95)));
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("an answer");
        submit_answer(&handle, &gw).await.unwrap();

        let outcome = next_exercise(&handle, &gw, &course).await.unwrap();
        assert_eq!(outcome, StartOutcome::Ready);
        assert_eq!(exercise_svc.calls.load(Ordering::SeqCst), 2);

        let session = handle.lock().await;
        assert!(session.result().is_none());
        assert_eq!(session.answer(), "");
    }

    #[tokio::test]
    async fn next_outside_graded_is_rejected() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, gw, course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::correct(95)));
        start_practice(&handle, &gw, &course).await.unwrap();

        let err = next_exercise(&handle, &gw, &course).await.unwrap_err();
        assert!(matches!(err, PracticeError::InvalidState(PracticeState::Ready)));
        assert_eq!(exercise_svc.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn set_answer_is_a_noop_outside_ready() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let (handle, _gw, _course) =
            ready_session(&exercise_svc, Arc::new(StubGradingService::correct(95)));

        let mut session = handle.lock().await;
        assert_eq!(session.state(), PracticeState::Loading);
        session.set_answer("too early");
        assert_eq!(session.answer(), "");
    }

    #[tokio::test]
    async fn concurrent_submits_send_exactly_one_grading_request() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let grading = Arc::new(BlockingGradingService::new());
        let (handle, gw, course) = ready_session(&exercise_svc, grading.clone());
        let gw = Arc::new(gw);
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("an answer");

        let first = {
            let handle = handle.clone();
            let gw = gw.clone();
            tokio::spawn(async move { submit_answer(&handle, &gw).await })
        };
        // Let the first submit reach the grading await.
        while grading.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.lock().await.state(), PracticeState::Submitting);

        let second = submit_answer(&handle, &gw).await.unwrap_err();
        assert!(matches!(second, PracticeError::Busy));

        grading.release();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, SubmitOutcome::Graded { advance: true });
        assert_eq!(grading.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_while_a_request_is_in_flight_is_rejected() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let grading = Arc::new(BlockingGradingService::new());
        let (handle, gw, course) = ready_session(&exercise_svc, grading.clone());
        let gw = Arc::new(gw);
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("an answer");

        let pending = {
            let handle = handle.clone();
            let gw = gw.clone();
            tokio::spawn(async move { submit_answer(&handle, &gw).await })
        };
        while grading.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let err = start_practice(&handle, &gw, &course).await.unwrap_err();
        assert!(matches!(err, PracticeError::Busy));

        grading.release();
        pending.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stale_grade_responses_are_discarded_after_invalidate() {
        let exercise_svc = Arc::new(StubExerciseService::open_ended());
        let grading = Arc::new(BlockingGradingService::new());
        let (handle, gw, course) = ready_session(&exercise_svc, grading.clone());
        let gw = Arc::new(gw);
        start_practice(&handle, &gw, &course).await.unwrap();
        handle.lock().await.set_answer("an answer");

        let pending = {
            let handle = handle.clone();
            let gw = gw.clone();
            tokio::spawn(async move { submit_answer(&handle, &gw).await })
        };
        while grading.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // The user navigates away while the grade is in flight.
        handle.lock().await.invalidate();
        grading.release();

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome, SubmitOutcome::Discarded);
        assert!(handle.lock().await.result().is_none());
    }
}
