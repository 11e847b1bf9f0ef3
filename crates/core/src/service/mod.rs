//! Service orchestration.

mod account;

#[cfg(test)]
mod tests;

pub use account::AccountService;
