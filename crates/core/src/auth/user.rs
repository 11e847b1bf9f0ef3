//! User records.

use chrono::{DateTime, Utc};
use investa_shared::types::UserId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A stored user, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Optional contact address.
    pub email: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Staff users may read admin reports.
    pub is_staff: bool,
    /// Inactive users cannot authenticate.
    pub is_active: bool,
    /// Registration time.
    pub date_joined: DateTime<Utc>,
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Optional contact address.
    pub email: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Staff flag.
    pub is_staff: bool,
}

impl NewUser {
    /// Materializes the record with a fresh ID.
    #[must_use]
    pub fn into_record(self, date_joined: DateTime<Utc>) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            is_staff: self.is_staff,
            is_active: true,
            date_joined,
        }
    }
}

/// User as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    /// User ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Staff flag.
    pub is_staff: bool,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    /// Login name: letters, digits and `@.+-_`.
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    /// Contact address.
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
    /// Given name.
    #[validate(length(max = 150))]
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[validate(length(max = 150))]
    #[serde(default)]
    pub last_name: String,
    /// Plaintext password.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username_characters"))
    }
}
