use chrono::{DateTime, Duration, Utc};

/// Public profile of the signed-in account.
#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// An authenticated identity, valid until sign-out or expiry.
///
/// Handed to whatever needs to act on behalf of the user instead of being
/// looked up globally.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub uid: String,
    pub profile: UserProfile,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(uid: impl Into<String>, email: Option<String>, id_token: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            profile: UserProfile {
                display_name: None,
                email,
                photo_url: None,
            },
            id_token: id_token.into(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    pub fn with_lifetime(mut self, seconds: i64) -> Self {
        self.expires_at = Utc::now() + Duration::seconds(seconds);
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
