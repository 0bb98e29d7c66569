//! Codemods: named frontmatter migrations and the runner that applies them.

pub mod filter;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod runner;

use crate::write::WriteError;
use crate::yaml::FrontmatterError;
use std::path::PathBuf;
use thiserror::Error;

pub use filter::RuleFilter;
pub use registry::Registry;
pub use rule::{edit_frontmatter, ApplyFn, Rule, RuleOutput};
pub use runner::{
    apply_rule, run_all, CancellationToken, DocumentRun, FileReport, FileStatus, RuleOutcome,
    RuleVerdict, RunOptions, Runner,
};

#[derive(Error, Debug)]
pub enum CodemodError {
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Utf8 { path: PathBuf },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("unknown rule '{id}'{}", did_you_mean(.suggestion))]
    UnknownRule {
        id: String,
        suggestion: Option<String>,
    },

    #[error("run cancelled")]
    Cancelled,
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(id) => format!(" (did you mean '{id}'?)"),
        None => String::new(),
    }
}
