//! # Identity Gateway
//!
//! Sign-up, sign-in, sign-out and password reset behind one result shape.
//! The provider does the real work; this layer only validates the sign-up
//! password length, classifies provider failures and remembers the session.
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{
    documents::{DocumentStore, create_profile},
    error::{AuthError, ProviderError},
    session::{Session, UserProfile},
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
}

pub struct Identity {
    provider: Arc<dyn IdentityProvider>,
    profiles: Option<Arc<dyn DocumentStore>>,
    session: RwLock<Option<Session>>,
}

impl Identity {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            profiles: None,
            session: RwLock::new(None),
        }
    }

    /// Also write a `users/{uid}` profile document on every sign-up.
    pub fn with_profiles(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidCredential(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let session = self
            .provider
            .create_account(email, password)
            .await
            .map_err(classify_sign_up)?;

        info!("Created account {}", session.uid);

        // the account stays even if its profile document cannot be written
        if let Some(store) = &self.profiles {
            if let Err(e) = create_profile(store.as_ref(), &session, email).await {
                warn!("Failed to create profile for {}: {e}", session.uid);
            }
        }

        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .provider
            .sign_in(email, password)
            .await
            .map_err(|e| AuthError::Provider(e.message))?;

        info!("Signed in {}", session.uid);

        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    pub fn sign_out(&self) {
        if let Some(session) = self.session.write().take() {
            info!("Signed out {}", session.uid);
        }
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.provider
            .send_password_reset(email)
            .await
            .map_err(|e| AuthError::Provider(e.message))
    }

    /// The live session, if any and not expired.
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .as_ref()
            .filter(|session| !session.is_expired())
            .cloned()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session().map(|session| session.profile)
    }
}

fn classify_sign_up(e: ProviderError) -> AuthError {
    match e.code.as_str() {
        "EMAIL_EXISTS" => AuthError::DuplicateAccount,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::MalformedEmail,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        _ => AuthError::Provider(e.message),
    }
}
