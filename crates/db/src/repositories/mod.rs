//! Repository abstractions for data access.
//!
//! Repositories implement the store ports of `investa-core` on top of
//! `SeaORM`, hiding the implementation details from the rest of the application.

pub mod account;
pub mod user;

pub use account::AccountRepository;
pub use user::UserRepository;
