//! User directory: registration, credential checks and principal lookup.

use std::sync::Arc;

use investa_shared::types::UserId;
use investa_shared::{AppError, AppResult};
use tracing::{info, warn};
use validator::Validate;

use super::password::Credentials;
use super::user::{NewUser, RegisterUser, UserRecord};
use crate::policy::Principal;
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

/// Front door to the user store.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
    credentials: Credentials,
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory").finish_non_exhaustive()
    }
}

impl UserDirectory {
    /// Creates a directory over `users`.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            credentials: Credentials::default(),
        }
    }

    /// Registers a regular user.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` for an invalid payload or a taken username.
    pub async fn register(&self, request: RegisterUser) -> AppResult<UserRecord> {
        self.register_with_role(request, false).await
    }

    /// Registers a user, optionally as staff.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` for an invalid payload or a taken username,
    /// `AppError::Internal` if hashing fails.
    pub async fn register_with_role(&self, request: RegisterUser, is_staff: bool) -> AppResult<UserRecord> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = self.credentials.hash(&request.password)?;
        let user = self
            .users
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
                is_staff,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, is_staff, "user registered");
        Ok(user)
    }

    /// Checks a username/password pair.
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` for unknown users, inactive users and wrong
    /// passwords alike.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserRecord> {
        let user = self.users.find_user_by_username(username).await?;
        let matches = self
            .credentials
            .check(password, user.as_ref().map(|u| u.password_hash.as_str()))?;

        match user {
            Some(user) if matches && user.is_active => Ok(user),
            Some(user) => {
                warn!(user_id = %user.id, "login rejected");
                Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
            None => {
                warn!(username, "login for unknown user");
                Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    /// Loads an active user by ID.
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` if the user is missing or inactive.
    pub async fn find_active(&self, user_id: UserId) -> AppResult<UserRecord> {
        match self.users.find_user(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::Unauthorized("User not found or inactive".to_string())),
        }
    }

    /// Resolves the principal a token's subject acts as.
    ///
    /// # Errors
    ///
    /// See [`Self::find_active`].
    pub async fn principal(&self, user_id: UserId) -> AppResult<Principal> {
        let user = self.find_active(user_id).await?;
        Ok(Principal {
            user_id: user.id,
            is_staff: user.is_staff,
        })
    }
}
