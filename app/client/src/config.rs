use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

use crate::error::AppError;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone, Debug)]
pub enum Backend {
    Firebase { api_key: String },
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: Backend,
    pub project_id: String,
    pub identity_url: String,
    pub firestore_url: String,
    pub create_profile: bool,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let api_key = read_secret("FIREBASE_API_KEY")
            .or_else(|| var("FIREBASE_API_KEY").ok())
            .ok_or_else(|| AppError::Config("FIREBASE_API_KEY is not set".to_string()))?;

        Ok(Self {
            backend: Backend::Firebase { api_key },
            project_id: try_load("FIREBASE_PROJECT_ID", "demo-project")?,
            identity_url: try_load("IDENTITY_URL", DEFAULT_IDENTITY_URL)?,
            firestore_url: try_load("FIRESTORE_URL", DEFAULT_FIRESTORE_URL)?,
            create_profile: try_load("CREATE_PROFILE", "true")?,
        })
    }

    /// Configuration for the in-process providers.
    pub fn offline() -> Self {
        Self {
            backend: Backend::Memory,
            project_id: "offline".to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            create_profile: true,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("invalid {key}: {e}"))
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let port: u16 = try_load("FIRENOTES_TEST_UNSET_PORT", "1111").unwrap();
        assert_eq!(port, 1111);

        let flag: bool = try_load("FIRENOTES_TEST_UNSET_FLAG", "true").unwrap();
        assert!(flag);
    }

    #[test]
    fn test_bad_default_is_error() {
        let result: Result<u16, AppError> = try_load("FIRENOTES_TEST_UNSET_NUMBER", "many");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_offline() {
        let config = Config::offline();
        assert!(matches!(config.backend, Backend::Memory));
        assert!(config.create_profile);
    }
}
