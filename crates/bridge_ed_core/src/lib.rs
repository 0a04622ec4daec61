pub mod catalog;
pub mod domain;
pub mod ports;

pub use catalog::Catalog;
pub use domain::{
    AuthSession, ChatMessage, ChatRole, Course, CourseCategory, Difficulty, Enrollment, Exercise,
    ExerciseError, ExerciseKind, ForumPost, GradeMetadata, GradeResult, Language, LedgerError,
    LocalizedText, Region, ServiceState, ServiceStatus, SubscriptionTier, User, UserStats,
};
pub use ports::{
    Clock, ExerciseGenerationService, GradingService, PortError, PortResult, StorageService,
    TranslationService, TutoringService,
};
