//! Users, authentication and password hashing.
//!
//! This module provides:
//! - Argon2id credentials
//! - User records and registration payloads
//! - The user directory (register, authenticate, resolve principals)

mod directory;
mod password;
mod user;

pub use directory::UserDirectory;
pub use password::{Credentials, PasswordError};
pub use user::{NewUser, PublicUser, RegisterUser, UserRecord};
