//! Guard verdicts and operation outcomes
//!
//! Skip means "not now, nothing is wrong" and maps to exit code 0.
//! Abort means a human has to look at the repository and maps to exit code 1.

use std::fmt;

/// A problem that stopped an operation, with an optional manual remedy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    pub reason: String,
    pub remedy: Option<String>,
}

impl Abort {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            remedy: None,
        }
    }

    /// Attach a suggested command or action for the user
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remedy = Some(remedy.into());
        self
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(remedy) = &self.remedy {
            write!(f, " (try: {})", remedy)?;
        }
        Ok(())
    }
}

/// Result of a single guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Skip(String),
    Abort(Abort),
}

impl Verdict {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Verdict::Proceed)
    }

    /// Lift a non-proceed verdict into an operation outcome
    pub fn into_outcome<T>(self) -> Option<Outcome<T>> {
        match self {
            Verdict::Proceed => None,
            Verdict::Skip(reason) => Some(Outcome::Skipped(reason)),
            Verdict::Abort(abort) => Some(Outcome::Aborted(abort)),
        }
    }
}

/// Result of a checkpoint or promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Skipped(String),
    Aborted(Abort),
}

impl<T> Outcome<T> {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Completed(_) | Outcome::Skipped(_) => 0,
            Outcome::Aborted(_) => 1,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted(_))
    }

    /// Transform the completed payload, keeping the classification
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Skipped(reason) => Outcome::Skipped(reason),
            Outcome::Aborted(abort) => Outcome::Aborted(abort),
        }
    }
}
