//! services/app/tests/session_flow.rs
//!
//! End-to-end flow over the session services with stub collaborator ports
//! and an in-memory store: sign up, enroll, practice, record the result,
//! chat with the tutor, and restore everything across a simulated restart.

use app_lib::adapters::MemoryStore;
use app_lib::session::{
    start_practice, submit_answer, AuthService, ForumBoard, Gateway, PracticeSession,
    SubmitOutcome, TutorLog,
};
use async_trait::async_trait;
use bridge_ed_core::catalog::Catalog;
use bridge_ed_core::domain::{
    ChatMessage, ChatRole, Course, CourseCategory, Difficulty, Exercise, ExerciseKind,
    GradeResult, Language, LocalizedText, Region, SubscriptionTier,
};
use bridge_ed_core::ports::{
    Clock, ExerciseGenerationService, GradingService, PortResult, TranslationService,
    TutoringService,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

//=========================================================================================
// Stub Ports
//=========================================================================================

struct FrozenClock;

#[async_trait]
impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    async fn sleep(&self, _duration: Duration) {}
}

struct CannedExercises;

#[async_trait]
impl ExerciseGenerationService for CannedExercises {
    async fn generate_exercise(
        &self,
        course_title: &str,
        _course_description: &str,
        _lang: Language,
    ) -> PortResult<Exercise> {
        Ok(Exercise {
            id: Uuid::new_v4(),
            question: format!("Summarize the core idea of {course_title}."),
            kind: ExerciseKind::OpenEnded,
            options: None,
            correct_answer: None,
        })
    }
}

struct GenerousGrader;

#[async_trait]
impl GradingService for GenerousGrader {
    async fn evaluate_exercise(
        &self,
        _exercise: &Exercise,
        _answer: &str,
        _lang: Language,
    ) -> PortResult<GradeResult> {
        Ok(GradeResult {
            score: 90,
            feedback: "well reasoned".to_string(),
            is_correct: true,
            metadata: None,
        })
    }
}

struct EchoTutor;

#[async_trait]
impl TutoringService for EchoTutor {
    async fn tutor_reply(&self, history: &[ChatMessage], _lang: Language) -> PortResult<String> {
        let last = history.last().map(|m| m.text.as_str()).unwrap_or_default();
        Ok(format!("About \"{last}\": let's break it down."))
    }
}

struct CountingTranslator {
    calls: AtomicUsize,
}

#[async_trait]
impl TranslationService for CountingTranslator {
    async fn translate(&self, text: &str, target: Language) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{target}] {text}"))
    }
}

fn course() -> Course {
    Course {
        id: "algebra-foundations".to_string(),
        title: LocalizedText::new("Foundations of Algebra", "Bases de l'algèbre", "أسس الجبر"),
        description: LocalizedText::new("equations", "équations", "معادلات"),
        category: CourseCategory::Science,
        region: vec![Region::West, Region::Arab],
        difficulty: Difficulty::Beginner,
        duration: "6h".to_string(),
    }
}

//=========================================================================================
// Flows
//=========================================================================================

#[tokio::test]
async fn full_learning_flow_survives_a_restart() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let clock: Arc<FrozenClock> = Arc::new(FrozenClock);
    let catalog = Catalog::new(vec![course()]);
    let course = catalog.get("algebra-foundations").unwrap();

    // Sign up and enroll.
    let auth = AuthService::new(store.clone(), clock.clone());
    let user = auth
        .sign_up("amira@bridge.ed", "Amira", SubscriptionTier::Pro)
        .await
        .unwrap();
    let user = {
        auth.enroll(&course.id).await.unwrap();
        auth.set_due_date(&course.id, "2026-09-01".parse().unwrap())
            .await
            .unwrap()
    };
    assert!(user.is_enrolled(&course.id));

    // Practice one exercise through the gateway and record the grade.
    let gateway = Gateway::new(
        Arc::new(CannedExercises),
        Arc::new(GenerousGrader),
        clock.clone(),
        false,
    );
    let handle = PracticeSession::begin(&user, course, Language::En).unwrap();
    start_practice(&handle, &gateway, course).await.unwrap();
    handle.lock().await.set_answer("symbols stand for unknowns");
    let outcome = submit_answer(&handle, &gateway).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Graded { advance: true });

    let score = handle.lock().await.result().unwrap().score;
    let user = auth
        .record_practice_result(&course.id, score)
        .await
        .unwrap();
    assert_eq!(user.enrollment(&course.id).unwrap().progress, 10);
    assert_eq!(user.stats.total_xp, 90);

    // Talk to the tutor in English; French stays separate.
    let mut tutor_log = TutorLog::open(store.clone(), clock.clone(), Language::En)
        .await
        .unwrap();
    tutor_log
        .append(ChatRole::User, "what is a variable?")
        .await
        .unwrap();
    let reply = tutor_log.request_reply(&EchoTutor).await.unwrap();
    assert!(reply.text.contains("what is a variable?"));

    tutor_log.load_for_language(Language::Fr).await.unwrap();
    assert!(tutor_log.messages().is_empty());

    // "Restart": fresh services over the same store see everything.
    let auth = AuthService::new(store.clone(), clock.clone());
    let restored = auth.restore().await.unwrap().expect("session persisted");
    assert_eq!(restored.email, "amira@bridge.ed");
    assert_eq!(restored.enrollment(&course.id).unwrap().progress, 10);
    assert_eq!(
        restored.enrollment(&course.id).unwrap().due_date,
        Some("2026-09-01".parse().unwrap())
    );

    let tutor_log = TutorLog::open(store, clock, Language::En).await.unwrap();
    assert_eq!(tutor_log.messages().len(), 2);
    assert_eq!(tutor_log.messages()[1].role, ChatRole::Model);
}

#[tokio::test]
async fn forum_translations_are_fetched_once_per_language() {
    let translator = CountingTranslator {
        calls: AtomicUsize::new(0),
    };
    let mut board = ForumBoard::seeded(&FrozenClock);

    let first = board
        .translate_post("3", Language::En, &translator)
        .await
        .unwrap();
    assert!(first.starts_with("[en]"));
    board
        .translate_post("3", Language::En, &translator)
        .await
        .unwrap();
    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);

    // A different target language is a fresh round trip.
    board
        .translate_post("3", Language::Ar, &translator)
        .await
        .unwrap();
    assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
}
