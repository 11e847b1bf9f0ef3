//! Admin cross-user reporting.
//!
//! Staff users can pull a report for any user: the total balance over all of
//! the user's accounts and the transactions on those accounts, optionally
//! limited to a date window.

pub mod service;
pub mod types;


pub use service::AdminReportService;
pub use types::*;
