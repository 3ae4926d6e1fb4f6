//! Version-control backend for Rollpoint
//!
//! This crate provides:
//! - The [`Backend`] capability trait used by guards, checkpoint and promotion
//! - [`GitCli`], the production backend that shells out to `git`
//! - Porcelain status parsing
//! - An in-memory `FakeBackend` (feature `testing`)

pub mod backend;
pub mod error;
pub mod git_ops;
pub mod status;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

pub use backend::{
    remote_ref, Backend, DiffScope, InProgress, PushMode, PushResult, RebaseResult, ResetMode,
    SyncState,
};
pub use error::{Error, Result};
pub use git_ops::{remote_failure_hint, GitCli};
pub use status::{RepositoryStatus, StatusEntry};

#[cfg(any(test, feature = "testing"))]
pub use fake::FakeBackend;
