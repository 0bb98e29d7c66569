//! Applying the registry to documents and files.
//!
//! Each file is owned by exactly one task from read to write. Rules run in
//! registry order and every rule sees the text the previous one produced.
//! Files may be processed in parallel; reports always come back in input
//! order.

use crate::codemod::filter::RuleFilter;
use crate::codemod::registry::Registry;
use crate::codemod::rule::{Rule, RuleOutput};
use crate::codemod::CodemodError;
use crate::document::Document;
use crate::write::{fingerprint, write_if_unchanged};
use crate::yaml::FrontmatterTree;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of running a single rule in memory.
pub type RuleOutcome = RuleOutput;

/// Shared flag that stops a run between files and between rules.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Persist changed files. `false` is a dry run.
    pub write: bool,
    /// Worker threads. `None` uses rayon's global pool, `Some(1)` runs on
    /// the calling thread.
    pub jobs: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            write: true,
            jobs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleVerdict {
    pub id: String,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Unchanged,
    /// At least one rule applied. Written unless the run was dry.
    Updated { rules: Vec<String> },
    Failed { error: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
    pub written: bool,
    pub verdicts: Vec<RuleVerdict>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// File contents before and after, kept only for updated files
    #[serde(skip)]
    pub before: Option<String>,
    #[serde(skip)]
    pub after: Option<String>,
}

impl FileReport {
    fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            written: false,
            verdicts: Vec::new(),
            warnings: Vec::new(),
            before: None,
            after: None,
        }
    }

    fn failed(path: &Path, error: CodemodError) -> Self {
        Self::new(
            path,
            FileStatus::Failed {
                error: error.to_string(),
            },
        )
    }

    pub fn is_updated(&self) -> bool {
        matches!(self.status, FileStatus::Updated { .. })
    }

    /// The file failed or one of its rules did.
    pub fn has_errors(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
            || self.verdicts.iter().any(|verdict| verdict.error.is_some())
    }
}

/// Outcome of running the selected rules over one in-memory document.
#[derive(Debug, Clone)]
pub struct DocumentRun {
    pub document: Document,
    pub verdicts: Vec<RuleVerdict>,
    pub warnings: Vec<String>,
    pub cancelled: bool,
}

impl DocumentRun {
    pub fn applied_rules(&self) -> Vec<String> {
        self.verdicts
            .iter()
            .filter(|verdict| verdict.applied)
            .map(|verdict| verdict.id.clone())
            .collect()
    }

    pub fn changed(&self) -> bool {
        self.verdicts.iter().any(|verdict| verdict.applied)
    }
}

pub struct Runner<'r> {
    registry: &'r Registry,
    filter: RuleFilter,
    options: RunOptions,
    cancel: CancellationToken,
}

impl<'r> Runner<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            filter: RuleFilter::all(),
            options: RunOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_filter(mut self, filter: RuleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run the selected rules over `document`.
    ///
    /// A frontmatter that does not decode, or uses YAML the editor cannot
    /// handle, skips every rule and is reported as a warning. A rule that fails, or whose output no longer decodes,
    /// is recorded and its output discarded; later rules still run.
    pub fn run_document(&self, document: &Document) -> DocumentRun {
        let rules = self.filter.select(self.registry);
        let mut run = DocumentRun {
            document: document.clone(),
            verdicts: Vec::with_capacity(rules.len()),
            warnings: Vec::new(),
            cancelled: false,
        };

        match FrontmatterTree::parse(document.frontmatter_text()) {
            Ok(_) => {}
            Err(err) if err.is_decode_error() => {
                warn!(error = %err, "skipping document with undecodable frontmatter");
                run.warnings.push(err.to_string());
                run.verdicts = rules.iter().map(|rule| skipped(rule)).collect();
                return run;
            }
            Err(err) => {
                let error = err.to_string();
                run.verdicts = rules
                    .iter()
                    .map(|rule| RuleVerdict {
                        error: Some(error.clone()),
                        ..skipped(rule)
                    })
                    .collect();
                return run;
            }
        }

        for rule in rules {
            if self.cancel.is_cancelled() {
                run.cancelled = true;
                return run;
            }
            let verdict = apply_one(rule, &mut run.document);
            run.verdicts.push(verdict);
        }
        run
    }

    /// Read, transform and (unless dry) write one file.
    pub fn run_file(&self, path: &Path) -> FileReport {
        if self.cancel.is_cancelled() {
            return FileReport::new(path, FileStatus::Cancelled);
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                return FileReport::failed(
                    path,
                    CodemodError::Io {
                        path: path.to_path_buf(),
                        source,
                    },
                )
            }
        };
        let expected = fingerprint(&bytes);
        let Ok(text) = String::from_utf8(bytes) else {
            return FileReport::failed(
                path,
                CodemodError::Utf8 {
                    path: path.to_path_buf(),
                },
            );
        };

        let document = match Document::parse(&text) {
            Ok(document) => document,
            Err(err) => return FileReport::failed(path, err.into()),
        };

        let run = self.run_document(&document);
        if run.cancelled {
            debug!(path = %path.display(), "cancelled before all rules ran");
            return FileReport::new(path, FileStatus::Cancelled);
        }

        let rules = run.applied_rules();
        let mut report = if rules.is_empty() {
            FileReport::new(path, FileStatus::Unchanged)
        } else {
            FileReport::new(path, FileStatus::Updated { rules })
        };
        report.warnings = run.warnings;

        if report.is_updated() {
            let rendered = run.document.render();
            if self.options.write {
                if let Err(err) = write_if_unchanged(path, expected, rendered.as_bytes()) {
                    let mut failed = FileReport::failed(path, err.into());
                    failed.verdicts = run.verdicts;
                    return failed;
                }
                report.written = true;
                info!(path = %path.display(), "updated");
            }
            report.before = Some(text);
            report.after = Some(rendered);
        }

        report.verdicts = run.verdicts;
        report
    }

    /// One report per file, in the order given.
    pub fn run_all(&self, files: &[PathBuf]) -> Vec<FileReport> {
        match self.options.jobs {
            Some(1) => files.iter().map(|file| self.run_file(file)).collect(),
            Some(jobs) => match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => pool.install(|| self.run_parallel(files)),
                Err(err) => {
                    warn!(error = %err, "could not build thread pool, running sequentially");
                    files.iter().map(|file| self.run_file(file)).collect()
                }
            },
            None => self.run_parallel(files),
        }
    }

    fn run_parallel(&self, files: &[PathBuf]) -> Vec<FileReport> {
        files.par_iter().map(|file| self.run_file(file)).collect()
    }
}

fn skipped(rule: &Rule) -> RuleVerdict {
    RuleVerdict {
        id: rule.id.to_string(),
        applied: false,
        error: None,
    }
}

/// Run `rule` against the current document, replacing it on success.
fn apply_one(rule: &Rule, document: &mut Document) -> RuleVerdict {
    let mut verdict = skipped(rule);

    let tree = match FrontmatterTree::parse(document.frontmatter_text()) {
        Ok(tree) => tree,
        Err(err) => {
            verdict.error = Some(err.to_string());
            return verdict;
        }
    };

    match rule.run(document, &tree) {
        Ok(output) if output.applied => {
            if let Err(err) = FrontmatterTree::parse(output.document.frontmatter_text()) {
                warn!(rule = rule.id, error = %err, "rule produced undecodable frontmatter");
                verdict.error = Some(format!("rule output does not decode: {err}"));
                return verdict;
            }
            debug!(rule = rule.id, "applied");
            *document = output.document;
            verdict.applied = true;
        }
        Ok(_) => {}
        Err(err) => {
            warn!(rule = rule.id, error = %err, "rule failed");
            verdict.error = Some(err.to_string());
        }
    }
    verdict
}

/// Run every rule `filter` selects over `files`, writing changed files.
pub fn run_all(registry: &Registry, files: &[PathBuf], filter: &RuleFilter) -> Vec<FileReport> {
    Runner::new(registry)
        .with_filter(filter.clone())
        .run_all(files)
}

/// Run a single rule over an in-memory document.
pub fn apply_rule(
    registry: &Registry,
    id: &str,
    document: &Document,
) -> Result<RuleOutcome, CodemodError> {
    let rule = registry.get(id).ok_or_else(|| CodemodError::UnknownRule {
        id: id.to_string(),
        suggestion: registry.suggest(id).map(str::to_string),
    })?;
    let tree = FrontmatterTree::parse(document.frontmatter_text())?;
    Ok(rule.run(document, &tree)?)
}
