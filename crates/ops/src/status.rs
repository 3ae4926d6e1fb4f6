//! Read-only report of the rolling checkpoint state

use crate::{guard, Workflow};
use anyhow::Result;
use rp_core::{is_wip_message, Verdict};
use rp_git::{remote_ref, Backend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Checked-out branch (`None` when detached)
    pub branch: Option<String>,
    pub trunk: String,
    pub trunk_tip: Option<String>,
    pub wip: String,
    pub wip_tip: Option<String>,
    /// Last fetched remote tip of the WIP branch
    pub wip_remote_tip: Option<String>,
    /// Commits on the WIP branch not on trunk
    pub wip_ahead: Option<usize>,
    pub wip_tip_is_checkpoint: bool,
    /// Outcome of the in-progress, unmerged and remote guards
    pub preflight: Verdict,
    pub changed_paths: usize,
}

impl StatusReport {
    /// The WIP branch is exactly one checkpoint ahead of trunk
    pub fn is_rolling(&self) -> bool {
        self.wip_ahead == Some(1) && self.wip_tip_is_checkpoint
    }

    /// The local WIP tip has been pushed
    pub fn is_published(&self) -> bool {
        self.wip_tip.is_some() && self.wip_tip == self.wip_remote_tip
    }
}

impl<'a, B: Backend + ?Sized> Workflow<'a, B> {
    /// Inspect the repository without fetching or mutating anything
    pub fn status(&self) -> Result<StatusReport> {
        let backend = self.backend;
        let branches = &self.branches;

        let wip_tip = backend.rev_parse(&format!("refs/heads/{}", branches.wip))?;
        let trunk_tip = backend.rev_parse(&format!("refs/heads/{}", branches.trunk))?;

        let (wip_ahead, wip_tip_is_checkpoint) = match (&wip_tip, &trunk_tip) {
            (Some(wip), Some(trunk)) => {
                let ahead = backend.commits_ahead(trunk, wip)?;
                let message = backend.commit_message(wip)?.unwrap_or_default();
                (Some(ahead), ahead > 0 && is_wip_message(&message))
            }
            _ => (None, false),
        };

        Ok(StatusReport {
            branch: backend.current_branch()?,
            trunk: branches.trunk.clone(),
            trunk_tip,
            wip: branches.wip.clone(),
            wip_tip,
            wip_remote_tip: backend.rev_parse(&remote_ref(&branches.remote, &branches.wip))?,
            wip_ahead,
            wip_tip_is_checkpoint,
            preflight: guard::preflight(backend, &branches.remote)?,
            changed_paths: backend.status()?.len(),
        })
    }
}
