//! Secret and credential deny-list
//!
//! Patterns use gitignore syntax and are matched case-insensitively against
//! staged paths, so `config/.ENV` and `keys/Deploy.PEM` are both caught.
//! The built-in list is always active; configuration can only add to it.

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Built-in deny patterns (always enforced)
pub const BUILTIN_PATTERNS: &[&str] = &[
    // Environment files
    ".env",
    ".env.*",
    "*.env",
    // Private keys and keystores
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*.jks",
    "*.keystore",
    "*.ppk",
    // SSH key ids
    "id_rsa*",
    "id_dsa*",
    "id_ecdsa*",
    "id_ed25519*",
    // Name fragments
    "*secret*",
    "*credential*",
];

/// Compiled deny-list
pub struct SecretFilter {
    matcher: Gitignore,
    pattern_count: usize,
}

impl SecretFilter {
    /// Build the filter from the built-in list plus `extra` patterns
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self> {
        // Root is irrelevant: staged paths are repository-relative
        let mut builder = GitignoreBuilder::new("");
        builder
            .case_insensitive(true)
            .context("Failed to enable case-insensitive secret matching")?;

        let mut pattern_count = 0;
        for pattern in BUILTIN_PATTERNS
            .iter()
            .copied()
            .chain(extra.iter().map(|p| p.as_ref()))
        {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("Invalid secret pattern: {}", pattern))?;
            pattern_count += 1;
        }

        let matcher = builder.build().context("Failed to build secret deny-list")?;
        Ok(Self {
            matcher,
            pattern_count,
        })
    }

    /// Filter with only the built-in patterns
    pub fn builtin() -> Result<Self> {
        Self::new::<&str>(&[])
    }

    /// Number of active patterns
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Check a single repository-relative path
    ///
    /// A path also matches when any of its parent directories does, so files
    /// under `secrets/` are caught even if their own name is innocent.
    pub fn is_denied(&self, path: &str) -> bool {
        self.matcher
            .matched_path_or_any_parents(Path::new(path), false)
            .is_ignore()
    }

    /// Return the subset of `paths` that hit the deny-list
    pub fn denied<'a, S: AsRef<str>>(&self, paths: &'a [S]) -> Vec<&'a str> {
        paths
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| self.is_denied(p))
            .collect()
    }
}
