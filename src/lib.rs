//! aw-fix: layout-preserving codemods for agentic workflow frontmatter
//!
//! Workflow files are Markdown documents with a `---` delimited YAML
//! frontmatter. Rules migrate deprecated frontmatter fields while keeping
//! every byte they do not touch: comments, blank lines, key order, quoting
//! and the Markdown body.
//!
//! # Architecture
//!
//! All edits compile down to a single primitive: [`Splice`], a verified
//! replacement of a range of frontmatter lines. Rules decide what to do from
//! a decoded [`FrontmatterTree`] and act through a [`FrontmatterEditor`],
//! which locates the lines to replace and renders new ones.
//!
//! # Safety
//!
//! - Splices verify the lines they replace before applying
//! - Atomic file writes (tempfile + fsync + rename)
//! - Files changed on disk during a run are never overwritten
//! - UTF-8 validation
//! - Idempotent rules: a second run changes nothing
//!
//! # Example
//!
//! ```
//! use aw_fix::{apply_rule, Document, Registry};
//!
//! let input = "---\non: push\ntools:\n  grep: true\n  edit:\n---\n# Task\n";
//! let document = Document::parse(input).unwrap();
//! let outcome = apply_rule(&Registry::builtin(), "grep-tool-removal", &document).unwrap();
//!
//! assert!(outcome.applied);
//! assert_eq!(
//!     outcome.document.render(),
//!     "---\non: push\ntools:\n  edit:\n---\n# Task\n"
//! );
//! ```

pub mod codemod;
pub mod config;
pub mod document;
pub mod logging;
pub mod splice;
pub mod write;
pub mod yaml;

// Re-exports
pub use codemod::{
    apply_rule, run_all, CancellationToken, CodemodError, FileReport, FileStatus, Registry, Rule,
    RuleFilter, RuleOutcome, RuleVerdict, RunOptions, Runner,
};
pub use config::{load_from_path, load_from_str, ConfigError, FixConfig, VersionError};
pub use document::{Document, FrontmatterBlock};
pub use splice::{Fingerprint, Splice, SpliceError, SpliceResult};
pub use write::{atomic_write, WriteError};
pub use yaml::{
    FrontmatterEdit, FrontmatterEditor, FrontmatterError, FrontmatterTree, InsertValue, KeyPath,
    Position, Scalar,
};
