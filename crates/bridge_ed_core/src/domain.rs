//! crates/bridge_ed_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or collaborator API,
//! but they derive `serde` traits because the persisted session layout is
//! plain JSON under fixed keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Localization Primitives
//=========================================================================================

/// The interface languages supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
    Ar,
}

impl Language {
    /// The two-letter code used in prompts and storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "ar" => Ok(Language::Ar),
            other => Err(format!("'{}' is not a supported language code", other)),
        }
    }
}

/// Geographic regions a course can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    West,
    Arab,
}

/// A piece of catalog text available in every supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub fr: String,
    pub ar: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, fr: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            fr: fr.into(),
            ar: ar.into(),
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Fr => &self.fr,
            Language::Ar => &self.ar,
        }
    }
}

//=========================================================================================
// User, Stats and the Enrollment Ledger
//=========================================================================================

/// Subscription level. Practice exercises are gated to the `Pro` tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Student,
    Pro,
}

/// Aggregate learning statistics carried on the user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub courses_completed: u32,
    pub avg_score: f32,
    pub total_xp: u32,
    pub streak: u32,
    /// Number of graded practice attempts, needed to keep `avg_score` a
    /// true running average.
    #[serde(default)]
    pub practice_attempts: u32,
}

/// A single entry in the user's enrollment ledger.
///
/// Invariant: at most one `Enrollment` per `course_id` within a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub course_id: String,
    /// Completion percentage, always within `0..=100`.
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Errors from enrollment ledger mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("no enrollment exists for course '{0}'")]
    NotEnrolled(String),
}

// Represents a signed-in learner - used throughout the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub tier: SubscriptionTier,
    pub enrolled: Vec<Enrollment>,
    pub stats: UserStats,
}

impl User {
    /// Fabricates a fresh user record with an empty ledger and zeroed stats.
    /// There is no real identity provider behind this.
    pub fn fabricate(email: impl Into<String>, name: impl Into<String>, tier: SubscriptionTier) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            tier,
            enrolled: Vec::new(),
            stats: UserStats::default(),
        }
    }

    pub fn enrollment(&self, course_id: &str) -> Option<&Enrollment> {
        self.enrolled.iter().find(|e| e.course_id == course_id)
    }

    fn enrollment_mut(&mut self, course_id: &str) -> Option<&mut Enrollment> {
        self.enrolled.iter_mut().find(|e| e.course_id == course_id)
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrollment(course_id).is_some()
    }

    /// Adds a ledger entry with progress 0. Idempotent: enrolling in a course
    /// already on the ledger changes nothing.
    pub fn enroll(&mut self, course_id: &str) {
        if !self.is_enrolled(course_id) {
            self.enrolled.push(Enrollment {
                course_id: course_id.to_string(),
                progress: 0,
                due_date: None,
            });
        }
    }

    /// Removes the ledger entry if present. No-op otherwise.
    pub fn unenroll(&mut self, course_id: &str) {
        self.enrolled.retain(|e| e.course_id != course_id);
    }

    /// Sets the due date for an existing enrollment.
    pub fn set_due_date(&mut self, course_id: &str, date: NaiveDate) -> Result<(), LedgerError> {
        let entry = self
            .enrollment_mut(course_id)
            .ok_or_else(|| LedgerError::NotEnrolled(course_id.to_string()))?;
        entry.due_date = Some(date);
        Ok(())
    }

    /// Sets the progress for an existing enrollment, clamping the value
    /// to `0..=100`. Returns the clamped value that was stored.
    pub fn set_progress(&mut self, course_id: &str, value: i32) -> Result<u8, LedgerError> {
        let entry = self
            .enrollment_mut(course_id)
            .ok_or_else(|| LedgerError::NotEnrolled(course_id.to_string()))?;
        let clamped = value.clamp(0, 100) as u8;
        entry.progress = clamped;
        Ok(clamped)
    }

    /// Records a correctly graded practice attempt: advances the course
    /// progress by ten points (clamped) and folds the score into the
    /// aggregate stats.
    pub fn record_practice(&mut self, course_id: &str, score: u8) -> Result<(), LedgerError> {
        let current = self
            .enrollment(course_id)
            .ok_or_else(|| LedgerError::NotEnrolled(course_id.to_string()))?
            .progress;
        self.set_progress(course_id, i32::from(current) + 10)?;

        let stats = &mut self.stats;
        let attempts = stats.practice_attempts;
        stats.avg_score =
            (stats.avg_score * attempts as f32 + f32::from(score)) / (attempts + 1) as f32;
        stats.practice_attempts = attempts + 1;
        stats.total_xp += u32::from(score);
        stats.streak += 1;
        stats.courses_completed = self.enrolled.iter().filter(|e| e.progress == 100).count() as u32;
        Ok(())
    }
}

/// The persisted session record: the fabricated user plus an opaque token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

//=========================================================================================
// Catalog Reference Data
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseCategory {
    Science,
    Humanities,
    Values,
    Tech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// An immutable catalog entry. The core never mutates courses; they are
/// read-only lookup data owned by whoever loads the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub category: CourseCategory,
    pub region: Vec<Region>,
    pub difficulty: Difficulty,
    pub duration: String,
}

//=========================================================================================
// Tutoring Conversation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the tutoring conversation. Immutable once appended;
/// insertion order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Exercises and Grading
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseKind {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "open-ended")]
    OpenEnded,
}

impl FromStr for ExerciseKind {
    type Err = ExerciseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(ExerciseKind::MultipleChoice),
            "open-ended" => Ok(ExerciseKind::OpenEnded),
            other => Err(ExerciseError::UnknownKind(other.to_string())),
        }
    }
}

/// Validation failures for collaborator-produced exercise payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExerciseError {
    #[error("'{0}' is not a known exercise type")]
    UnknownKind(String),
    #[error("a multiple-choice exercise must carry at least one option")]
    MissingOptions,
}

/// A generated practice exercise. Produced by the collaborator and consumed
/// exactly once per practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub question: String,
    pub kind: ExerciseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl Exercise {
    /// Checks the structural invariants the collaborator payload must meet.
    /// The payload is never trusted blindly: a multiple-choice exercise
    /// without options is rejected here rather than surfacing downstream.
    pub fn validate(&self) -> Result<(), ExerciseError> {
        if self.kind == ExerciseKind::MultipleChoice
            && self.options.as_ref().map_or(true, |o| o.is_empty())
        {
            return Err(ExerciseError::MissingOptions);
        }
        Ok(())
    }
}

/// Latency and size metadata stamped on a grading round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeMetadata {
    pub processing_ms: u64,
    pub tokens: u32,
}

/// The graded outcome of one submitted answer. Terminal for its practice
/// session until a new exercise is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Score within `0..=100`.
    pub score: u8,
    pub feedback: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GradeMetadata>,
}

//=========================================================================================
// Service Health and Forum Posts
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Degraded,
    Offline,
}

/// A row of the gateway's simulated health dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub status: ServiceState,
    pub latency_ms: u64,
}

/// A community forum post with a per-language translation memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub author: String,
    pub content: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub translations: HashMap<Language, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(courses: &[&str]) -> User {
        let mut user = User::fabricate("a@b.com", "a", SubscriptionTier::Pro);
        for id in courses {
            user.enroll(id);
        }
        user
    }

    #[test]
    fn enroll_then_unenroll_restores_prior_ledger() {
        let mut user = user_with(&["c1"]);
        let before: Vec<String> = user.enrolled.iter().map(|e| e.course_id.clone()).collect();

        user.enroll("c2");
        user.unenroll("c2");

        let after: Vec<String> = user.enrolled.iter().map(|e| e.course_id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn enroll_is_idempotent() {
        let mut user = user_with(&[]);
        user.enroll("c1");
        user.enroll("c1");
        assert_eq!(user.enrolled.len(), 1);
    }

    #[test]
    fn unenroll_missing_course_is_a_noop() {
        let mut user = user_with(&["c1"]);
        user.unenroll("does-not-exist");
        assert_eq!(user.enrolled.len(), 1);
    }

    #[test]
    fn set_progress_clamps_to_valid_range() {
        let mut user = user_with(&["c1"]);
        assert_eq!(user.set_progress("c1", 150), Ok(100));
        assert_eq!(user.enrollment("c1").unwrap().progress, 100);
        assert_eq!(user.set_progress("c1", -5), Ok(0));
        assert_eq!(user.enrollment("c1").unwrap().progress, 0);
    }

    #[test]
    fn mutating_a_missing_enrollment_is_rejected() {
        let mut user = user_with(&[]);
        assert_eq!(
            user.set_progress("c1", 50),
            Err(LedgerError::NotEnrolled("c1".to_string()))
        );
        assert_eq!(
            user.set_due_date("c1", NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            Err(LedgerError::NotEnrolled("c1".to_string()))
        );
    }

    #[test]
    fn set_due_date_updates_existing_entry() {
        let mut user = user_with(&["c1"]);
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        user.set_due_date("c1", date).unwrap();
        assert_eq!(user.enrollment("c1").unwrap().due_date, Some(date));
    }

    #[test]
    fn record_practice_advances_progress_and_stats() {
        let mut user = user_with(&["c1"]);
        user.record_practice("c1", 80).unwrap();
        assert_eq!(user.enrollment("c1").unwrap().progress, 10);
        assert_eq!(user.stats.total_xp, 80);
        assert_eq!(user.stats.streak, 1);
        assert_eq!(user.stats.practice_attempts, 1);
        assert!((user.stats.avg_score - 80.0).abs() < f32::EPSILON);

        user.record_practice("c1", 40).unwrap();
        assert!((user.stats.avg_score - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn record_practice_marks_completed_courses() {
        let mut user = user_with(&["c1"]);
        user.set_progress("c1", 95).unwrap();
        user.record_practice("c1", 100).unwrap();
        assert_eq!(user.enrollment("c1").unwrap().progress, 100);
        assert_eq!(user.stats.courses_completed, 1);
    }

    #[test]
    fn exercise_kind_parsing_rejects_unknown_values() {
        assert_eq!(
            "multiple-choice".parse::<ExerciseKind>(),
            Ok(ExerciseKind::MultipleChoice)
        );
        assert_eq!("open-ended".parse::<ExerciseKind>(), Ok(ExerciseKind::OpenEnded));
        assert!(matches!(
            "essay".parse::<ExerciseKind>(),
            Err(ExerciseError::UnknownKind(_))
        ));
    }

    #[test]
    fn multiple_choice_without_options_fails_validation() {
        let exercise = Exercise {
            id: Uuid::new_v4(),
            question: "Pick one".to_string(),
            kind: ExerciseKind::MultipleChoice,
            options: None,
            correct_answer: None,
        };
        assert_eq!(exercise.validate(), Err(ExerciseError::MissingOptions));

        let open = Exercise {
            id: Uuid::new_v4(),
            question: "Elaborate".to_string(),
            kind: ExerciseKind::OpenEnded,
            options: None,
            correct_answer: None,
        };
        assert_eq!(open.validate(), Ok(()));
    }

    #[test]
    fn session_record_round_trips_through_json() {
        let mut user = user_with(&["c1"]);
        user.set_due_date("c1", NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
            .unwrap();
        let session = AuthSession {
            user,
            token: "opaque".to_string(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let restored: AuthSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
