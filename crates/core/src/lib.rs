//! Core types for Rollpoint
//!
//! This crate provides:
//! - Layered configuration (defaults, TOML files, environment overrides)
//! - BLAKE3 content fingerprints for the stability detector
//! - The rolling WIP commit message format
//! - The secret/credential deny-list applied before committing
//! - Typed guard verdicts and operation outcomes

pub mod config;
pub mod fingerprint;
pub mod message;
pub mod outcome;
pub mod secrets;

// Re-exports
pub use config::{BranchConfig, Config, GuardConfig, WatchConfig};
pub use fingerprint::{ContentFingerprint, FingerprintBuilder};
pub use message::{is_wip_message, WipMessage};
pub use outcome::{Abort, Outcome, Verdict};
pub use secrets::SecretFilter;
