//! Shared types, errors, and configuration for Investa.
//!
//! This crate provides common types used across all other crates:
//! - `Money`, a decimal(10,2) amount that never touches floating point
//! - Typed IDs for users, accounts, and transactions
//! - Application-wide error types
//! - Configuration management
//! - JWT access/refresh token handling

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, TokenKind, TokenPair};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
