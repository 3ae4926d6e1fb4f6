//! CLI command implementations

pub mod checkpoint;
pub mod config;
pub mod promote;
pub mod status;
pub mod watch;
