//! services/app/src/session/auth.rs
//!
//! The session store: the authenticated user record, mirrored to local
//! persistence. There is no real identity provider behind sign-in/sign-up;
//! any credentials produce a fabricated user (documented limitation of the
//! platform). Every mutation persists before it is applied in memory, so the
//! two views never drift apart.

use crate::error::AppError;
use bridge_ed_core::domain::{AuthSession, LedgerError, SubscriptionTier, User};
use bridge_ed_core::ports::{Clock, PortError, PortResult, StorageService};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// The fixed key the session record lives under.
pub const SESSION_KEY: &str = "bridge_ed_session";

// Fabricated network delays, matching the simulated auth edge.
const SIGN_IN_DELAY: Duration = Duration::from_millis(800);
const SIGN_UP_DELAY: Duration = Duration::from_millis(1000);

//=========================================================================================
// AuthService
//=========================================================================================

/// Owns the signed-in session for the lifetime of the process.
pub struct AuthService {
    store: Arc<dyn StorageService>,
    clock: Arc<dyn Clock>,
    session: Mutex<Option<AuthSession>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn StorageService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            session: Mutex::new(None),
        }
    }

    /// Loads the persisted session, if any. A missing or corrupt record
    /// means "signed out" and is never an error.
    pub async fn restore(&self) -> PortResult<Option<User>> {
        let session = match self.store.get(SESSION_KEY).await? {
            None => None,
            Some(raw) => match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("persisted session is corrupt, treating as signed out: {e}");
                    None
                }
            },
        };
        let user = session.as_ref().map(|s| s.user.clone());
        *self.session.lock().await = session;
        Ok(user)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.lock().await.as_ref().map(|s| s.user.clone())
    }

    /// Signs in with any syntactically plausible credentials. The password
    /// is accepted unchecked; a fresh `free`-tier user is fabricated with
    /// the email's local part as display name.
    pub async fn sign_in(&self, email: &str, _password: &str) -> PortResult<User> {
        self.clock.sleep(SIGN_IN_DELAY).await;
        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = User::fabricate(email, name, SubscriptionTier::Free);
        info!(email = %email, "signing in");
        self.install(user).await
    }

    /// Creates an account with the chosen display name and tier.
    pub async fn sign_up(
        &self,
        email: &str,
        name: &str,
        tier: SubscriptionTier,
    ) -> PortResult<User> {
        self.clock.sleep(SIGN_UP_DELAY).await;
        let user = User::fabricate(email, name, tier);
        info!(email = %email, ?tier, "signing up");
        self.install(user).await
    }

    async fn install(&self, user: User) -> PortResult<User> {
        let session = AuthSession {
            user,
            token: Uuid::new_v4().to_string(),
        };
        let raw = serde_json::to_string(&session)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut guard = self.session.lock().await;
        self.store.put(SESSION_KEY, &raw).await?;
        let user = session.user.clone();
        *guard = Some(session);
        Ok(user)
    }

    /// Clears the persisted session. Idempotent.
    pub async fn sign_out(&self) -> PortResult<()> {
        let mut guard = self.session.lock().await;
        self.store.remove(SESSION_KEY).await?;
        *guard = None;
        Ok(())
    }

    /// Overwrites the session with a complete user record. Callers must
    /// supply the full `User`; partial updates are not expressible.
    pub async fn update_user(&self, user: User) -> Result<User, AppError> {
        self.mutate_user(move |current| {
            *current = user;
            Ok(())
        })
        .await
    }

    //-------------------------------------------------------------------------------------
    // Enrollment ledger operations
    //-------------------------------------------------------------------------------------

    pub async fn enroll(&self, course_id: &str) -> Result<User, AppError> {
        self.mutate_user(|user| {
            user.enroll(course_id);
            Ok(())
        })
        .await
    }

    pub async fn unenroll(&self, course_id: &str) -> Result<User, AppError> {
        self.mutate_user(|user| {
            user.unenroll(course_id);
            Ok(())
        })
        .await
    }

    pub async fn set_due_date(&self, course_id: &str, date: NaiveDate) -> Result<User, AppError> {
        self.mutate_user(|user| user.set_due_date(course_id, date))
            .await
    }

    pub async fn set_progress(&self, course_id: &str, value: i32) -> Result<User, AppError> {
        self.mutate_user(|user| user.set_progress(course_id, value).map(|_| ()))
            .await
    }

    /// Applies a correct practice result: progress advance plus stats.
    pub async fn record_practice_result(
        &self,
        course_id: &str,
        score: u8,
    ) -> Result<User, AppError> {
        self.mutate_user(|user| user.record_practice(course_id, score))
            .await
    }

    /// Runs a ledger mutation against a copy of the user, persists the
    /// result, and only then swaps it in. A failed validation or a failed
    /// write leaves both the in-memory and the persisted record untouched.
    async fn mutate_user<F>(&self, mutate: F) -> Result<User, AppError>
    where
        F: FnOnce(&mut User) -> Result<(), LedgerError>,
    {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(AppError::NoSession)?;

        let mut user = session.user.clone();
        mutate(&mut user)?;

        let updated = AuthSession {
            user,
            token: session.token.clone(),
        };
        let raw = serde_json::to_string(&updated)
            .map_err(|e| PortError::Unexpected(e.to_string()))
            .map_err(AppError::Port)?;
        self.store
            .put(SESSION_KEY, &raw)
            .await
            .map_err(AppError::Port)?;

        *session = updated;
        Ok(session.user.clone())
    }
}
