//! Core business logic for Investa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage and caching are reached through ports that the outer crates implement.
//!
//! # Modules
//!
//! - `account` - Investment account types and request payloads
//! - `ledger` - Balance mutation engine, transaction recorder, error taxonomy
//! - `policy` - Account-type access policy
//! - `cache` - Account/report cache port and its moka adapter
//! - `store` - Store ports and the in-memory store
//! - `service` - Account service orchestration
//! - `reports` - Admin cross-user reporting
//! - `auth` - Password hashing and the user directory

pub mod account;
pub mod auth;
pub mod cache;
pub mod ledger;
pub mod policy;
pub mod reports;
pub mod service;
pub mod store;
