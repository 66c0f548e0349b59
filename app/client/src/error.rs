use thiserror::Error;

/// Failure of an identity operation, worded for the person at the screen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredential(String),

    #[error("An account already exists for this email")]
    DuplicateAccount,

    #[error("The email address is badly formatted")]
    MalformedEmail,

    #[error("The password is too weak")]
    WeakPassword,

    #[error("{0}")]
    Provider(String),
}

/// Raw failure reported by an identity provider.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Read or write failure from the document backend. Never classified further.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Store error: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::new(e.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::new("NETWORK_ERROR", e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
}
