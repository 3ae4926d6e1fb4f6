//! BLAKE3 content fingerprints for working-tree change detection
//!
//! A fingerprint covers three streams in a fixed order: the staged diff, the
//! unstaged diff and the sorted list of untracked paths. Each stream is
//! preceded by a literal marker so that bytes moving from one stream to
//! another still change the digest.

/// Marker written before the staged diff
const STAGED_MARKER: &[u8] = b"\n--rollpoint:staged--\n";
/// Marker written before the unstaged diff
const UNSTAGED_MARKER: &[u8] = b"\n--rollpoint:unstaged--\n";
/// Marker written before the untracked path list
const UNTRACKED_MARKER: &[u8] = b"\n--rollpoint:untracked--\n";

/// A BLAKE3 digest over the working-tree content (32 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq)]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    /// Create a fingerprint from raw digest bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        const HEX_CHARS: &[u8] = b"0123456789abcdef";
        let mut hex = String::with_capacity(64);
        for &byte in &self.0 {
            hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
            hex.push(HEX_CHARS[(byte & 0xf) as usize] as char);
        }
        hex
    }

    /// Short form used in log lines
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }

    /// Fingerprint the three working-tree streams in one call
    pub fn compute<S: AsRef<str>>(staged: &[u8], unstaged: &[u8], untracked: &[S]) -> Self {
        let mut builder = FingerprintBuilder::new();
        builder.staged(staged);
        builder.unstaged(unstaged);
        builder.untracked(untracked);
        builder.finalize()
    }
}

impl std::fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentFingerprint({})", self.to_hex())
    }
}

impl std::fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Streaming builder for [`ContentFingerprint`]
///
/// Streams must be fed in order: staged, unstaged, untracked. Diffs can be
/// large, so they are hashed incrementally instead of concatenated first.
pub struct FingerprintBuilder {
    hasher: blake3::Hasher,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    /// Feed the staged diff
    pub fn staged(&mut self, diff: &[u8]) -> &mut Self {
        self.hasher.update(STAGED_MARKER);
        self.hasher.update(diff);
        self
    }

    /// Feed the unstaged diff
    pub fn unstaged(&mut self, diff: &[u8]) -> &mut Self {
        self.hasher.update(UNSTAGED_MARKER);
        self.hasher.update(diff);
        self
    }

    /// Feed the untracked paths; sorted here so callers need not care about
    /// the order the backend listed them in
    pub fn untracked<S: AsRef<str>>(&mut self, paths: &[S]) -> &mut Self {
        let mut sorted: Vec<&str> = paths.iter().map(|p| p.as_ref()).collect();
        sorted.sort_unstable();

        self.hasher.update(UNTRACKED_MARKER);
        for path in sorted {
            self.hasher.update(path.as_bytes());
            self.hasher.update(b"\n");
        }
        self
    }

    pub fn finalize(&self) -> ContentFingerprint {
        ContentFingerprint::from_bytes(*self.hasher.finalize().as_bytes())
    }
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}
