//! Parsed `git status --porcelain` output

/// One `XY path` line from porcelain status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Two-character change code (`" M"`, `"A "`, `"??"`, `"UU"`, ...)
    pub code: String,
    /// Path after any rename arrow
    pub path: String,
}

impl StatusEntry {
    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }
}

/// Repository status as an ordered list of entries
///
/// The raw text is kept verbatim: the stability detector compares it
/// byte-for-byte between polls as its cheap change signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
    raw: String,
    entries: Vec<StatusEntry>,
}

impl RepositoryStatus {
    /// Parse porcelain v1 output
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .lines()
            .filter(|line| line.len() > 3)
            .map(|line| {
                let (code, rest) = line.split_at(2);
                let path = rest.trim_start();
                let path = match path.split_once(" -> ") {
                    Some((_, to)) => to,
                    None => path,
                };
                StatusEntry {
                    code: code.to_string(),
                    path: path.to_string(),
                }
            })
            .collect();

        Self {
            raw: raw.to_string(),
            entries,
        }
    }

    /// No staged, unstaged or untracked changes
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }
}
