//! Workflow integration tests
//!
//! Complete checkpoint/promote cycles and the surrounding CLI surface.

pub mod checkpoint_cycle;
pub mod cli_surface;
pub mod promote_cycle;
pub mod watch_loop;
