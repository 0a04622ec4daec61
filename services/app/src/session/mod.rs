pub mod auth;
pub mod forum;
pub mod gateway;
pub mod practice;
pub mod state;
pub mod tutor;

// Re-export the session services to make them easily accessible to the
// binary that wires the application together.
pub use auth::AuthService;
pub use forum::ForumBoard;
pub use gateway::Gateway;
pub use practice::{
    next_exercise, start_practice, submit_answer, PracticeError, PracticeSession, PracticeState,
    StartOutcome, SubmitOutcome,
};
pub use state::AppState;
pub use tutor::TutorLog;
