//! Shared helpers for logging setup and retry policy.

pub mod bootstrap;
pub mod retry;
