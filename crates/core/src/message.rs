//! Rolling WIP commit messages
//!
//! Every checkpoint commit carries a subject of the form
//! `wip: <UTC timestamp>[ · <label>]`. Checkpoint amends a tip commit whose
//! subject matches this pattern; promotion refuses a tip that does not.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Subject prefix shared by all WIP commits
pub const WIP_PREFIX: &str = "wip: ";

/// Separator between timestamp and label
pub const LABEL_SEPARATOR: &str = " · ";

fn wip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^wip: \d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z(?: · .+)?$")
            .expect("WIP pattern is a valid regex")
    })
}

/// A WIP commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipMessage {
    pub timestamp: DateTime<Utc>,
    pub label: Option<String>,
}

impl WipMessage {
    /// Build a message for `timestamp`; blank labels are dropped and
    /// multi-line labels are collapsed onto one line
    pub fn new(timestamp: DateTime<Utc>, label: Option<&str>) -> Self {
        let label = label
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|l| !l.is_empty());

        Self { timestamp, label }
    }

    /// Message stamped with the current time
    pub fn now(label: Option<&str>) -> Self {
        Self::new(Utc::now(), label)
    }
}

impl fmt::Display for WipMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            WIP_PREFIX,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        if let Some(label) = &self.label {
            write!(f, "{}{}", LABEL_SEPARATOR, label)?;
        }
        Ok(())
    }
}

/// Check whether a commit message is a WIP checkpoint message
///
/// Only the subject line is considered; trailing body text is ignored.
pub fn is_wip_message(message: &str) -> bool {
    let subject = message.lines().next().unwrap_or("").trim_end();
    wip_pattern().is_match(subject)
}
