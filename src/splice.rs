use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The single edit primitive: replace a line range with verification.
///
/// Every structural frontmatter edit compiles down to one splice over the
/// frontmatter's lines. Lines keep their own terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Splice does nothing until apply() is called"]
pub struct Splice {
    /// First line replaced (inclusive)
    pub start: usize,
    /// Last line replaced (exclusive)
    pub end: usize,
    /// Lines written in place of `[start, end)`
    pub replacement: Vec<String>,
    /// What the replaced lines must look like before applying
    pub expected: Fingerprint,
}

/// Verification strategy for the lines a splice replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    Exact(String),
    /// xxh3 hash of the expected text (used for large spans)
    Hash(u64),
}

impl Fingerprint {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Fingerprint::Exact(expected) => text == expected,
            Fingerprint::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }

    /// Exact match for small spans, hash over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            Fingerprint::Hash(xxh3_64(text.as_bytes()))
        } else {
            Fingerprint::Exact(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("lines [{start}, {end}) do not match the expected text (found {found:?})")]
    Mismatch {
        start: usize,
        end: usize,
        found: String,
    },

    #[error("invalid line range [{start}, {end}) in text of {len} lines")]
    OutOfRange { start: usize, end: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "SpliceResult should be checked for applied/already-applied"]
pub enum SpliceResult {
    Applied { removed: usize, inserted: usize },
    /// The current lines already equal the replacement
    AlreadyApplied,
}

impl Splice {
    /// Create a splice over `lines[start..end]`, fingerprinting the current text.
    pub fn new(lines: &[String], start: usize, end: usize, replacement: Vec<String>) -> Self {
        let current = lines
            .get(start..end)
            .map(|slice| slice.concat())
            .unwrap_or_default();
        Self {
            start,
            end,
            replacement,
            expected: Fingerprint::from_text(&current),
        }
    }

    /// Pure insertion before line `at`.
    pub fn insert(at: usize, replacement: Vec<String>) -> Self {
        Self {
            start: at,
            end: at,
            replacement,
            expected: Fingerprint::Exact(String::new()),
        }
    }

    fn validate(&self, lines: &[String]) -> Result<String, SpliceError> {
        if self.start > self.end || self.end > lines.len() {
            return Err(SpliceError::OutOfRange {
                start: self.start,
                end: self.end,
                len: lines.len(),
            });
        }

        let current = lines[self.start..self.end].concat();
        if current == self.replacement.concat() {
            return Ok(current);
        }

        if !self.expected.matches(&current) {
            return Err(SpliceError::Mismatch {
                start: self.start,
                end: self.end,
                found: current,
            });
        }

        Ok(current)
    }

    pub fn apply(&self, lines: &mut Vec<String>) -> Result<SpliceResult, SpliceError> {
        let current = self.validate(lines)?;
        if current == self.replacement.concat() && self.end - self.start == self.replacement.len()
        {
            return Ok(SpliceResult::AlreadyApplied);
        }

        lines.splice(self.start..self.end, self.replacement.iter().cloned());
        Ok(SpliceResult::Applied {
            removed: self.end - self.start,
            inserted: self.replacement.len(),
        })
    }
}
