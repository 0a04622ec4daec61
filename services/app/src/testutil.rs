//! services/app/src/testutil.rs
//!
//! Shared stub ports for the unit tests: a manual clock that never spends
//! real time, deterministic collaborator stubs with call counters, and a
//! storage adapter whose writes can be made to fail.

use async_trait::async_trait;
use bridge_ed_core::domain::{
    ChatMessage, Course, CourseCategory, Difficulty, Exercise, ExerciseKind, GradeResult,
    Language, LocalizedText, Region, SubscriptionTier, User,
};
use bridge_ed_core::ports::{
    Clock, ExerciseGenerationService, GradingService, PortError, PortResult, StorageService,
    TranslationService, TutoringService,
};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::adapters::MemoryStore;

//=========================================================================================
// Fixtures
//=========================================================================================

pub fn course(id: &str) -> Course {
    Course {
        id: id.to_string(),
        title: LocalizedText::new("Foundations of Algebra", "Bases de l'algèbre", "أسس الجبر"),
        description: LocalizedText::new(
            "From Al-Jabr to abstract structures",
            "D'Al-Jabr aux structures abstraites",
            "من الجبر إلى البنى المجردة",
        ),
        category: CourseCategory::Science,
        region: vec![Region::West, Region::Arab],
        difficulty: Difficulty::Beginner,
        duration: "6h".to_string(),
    }
}

pub fn pro_user(enrolled: &[&str]) -> User {
    let mut user = User::fabricate("pro@bridge.ed", "pro", SubscriptionTier::Pro);
    for id in enrolled {
        user.enroll(id);
    }
    user
}

//=========================================================================================
// Clock
//=========================================================================================

/// A clock pinned to a fixed instant. `sleep` records the requested delay
/// and returns immediately.
pub struct ManualClock {
    now: DateTime<Utc>,
    slept: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
            slept: AtomicU64::new(0),
        }
    }

    /// Total simulated delay requested so far, in milliseconds.
    pub fn slept_ms(&self) -> u64 {
        self.slept.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    async fn sleep(&self, duration: Duration) {
        self.slept
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

//=========================================================================================
// Storage
//=========================================================================================

/// Wraps a `MemoryStore` and fails writes on demand, for persistence
/// atomicity tests.
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageService for FlakyStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("disk full".to_string()));
        }
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("disk full".to_string()));
        }
        self.inner.remove(key).await
    }
}

//=========================================================================================
// Collaborator Stubs
//=========================================================================================

pub struct StubExerciseService {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl StubExerciseService {
    pub fn open_ended() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ExerciseGenerationService for StubExerciseService {
    async fn generate_exercise(
        &self,
        course_title: &str,
        _course_description: &str,
        _lang: Language,
    ) -> PortResult<Exercise> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Collaborator("content service down".to_string()));
        }
        Ok(Exercise {
            id: Uuid::new_v4(),
            question: format!("Explain one key idea from {course_title}."),
            kind: ExerciseKind::OpenEnded,
            options: None,
            correct_answer: None,
        })
    }
}

pub struct StubGradingService {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    score: u8,
    is_correct: bool,
}

impl StubGradingService {
    pub fn correct(score: u8) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            score,
            is_correct: true,
        }
    }

    pub fn incorrect(score: u8) -> Self {
        Self {
            is_correct: false,
            ..Self::correct(score)
        }
    }
}

#[async_trait]
impl GradingService for StubGradingService {
    async fn evaluate_exercise(
        &self,
        _exercise: &Exercise,
        _answer: &str,
        _lang: Language,
    ) -> PortResult<GradeResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Collaborator("grading service down".to_string()));
        }
        Ok(GradeResult {
            score: self.score,
            feedback: "stub feedback".to_string(),
            is_correct: self.is_correct,
            metadata: None,
        })
    }
}

/// A grading stub that parks every call until `release` is invoked, so tests
/// can observe the `Submitting` window.
pub struct BlockingGradingService {
    pub calls: AtomicUsize,
    gate: Arc<Semaphore>,
}

impl BlockingGradingService {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl GradingService for BlockingGradingService {
    async fn evaluate_exercise(
        &self,
        _exercise: &Exercise,
        _answer: &str,
        _lang: Language,
    ) -> PortResult<GradeResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        permit.forget();
        Ok(GradeResult {
            score: 100,
            feedback: "released".to_string(),
            is_correct: true,
            metadata: None,
        })
    }
}

pub struct StubTutorService {
    pub calls: AtomicUsize,
    pub last_history_len: AtomicUsize,
    reply: Option<String>,
}

impl StubTutorService {
    pub fn replying(reply: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_history_len: AtomicUsize::new(0),
            reply: Some(reply.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_history_len: AtomicUsize::new(0),
            reply: None,
        }
    }
}

#[async_trait]
impl TutoringService for StubTutorService {
    async fn tutor_reply(&self, history: &[ChatMessage], _lang: Language) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_history_len.store(history.len(), Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(PortError::Collaborator("tutor service down".to_string())),
        }
    }
}

pub struct StubTranslationService {
    pub calls: AtomicUsize,
    fail: AtomicBool,
}

impl StubTranslationService {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let stub = Self::new();
        stub.fail.store(true, Ordering::SeqCst);
        stub
    }
}

#[async_trait]
impl TranslationService for StubTranslationService {
    async fn translate(&self, text: &str, target: Language) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Collaborator("translation service down".to_string()));
        }
        Ok(format!("[{target}] {text}"))
    }
}
