use crate::config::version::parse_requirement;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Contents of `aw-fix.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixConfig {
    #[serde(default)]
    pub run: RunSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl FixConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.run.jobs == Some(0) {
            issues.push(ValidationIssue::InvalidValue {
                field: "run.jobs",
                message: "must be at least 1".to_string(),
            });
        }

        if let Some(since) = &self.run.since {
            if let Err(err) = parse_requirement(since) {
                issues.push(ValidationIssue::InvalidValue {
                    field: "run.since",
                    message: err.to_string(),
                });
            }
        }

        for (field, ids) in [("run.rules", &self.run.rules), ("run.skip", &self.run.skip)] {
            if ids.iter().any(|id| id.trim().is_empty()) {
                issues.push(ValidationIssue::InvalidValue {
                    field,
                    message: "rule ids must not be empty".to_string(),
                });
            }
        }

        for id in &self.run.rules {
            if self.run.skip.contains(id) {
                issues.push(ValidationIssue::Conflict {
                    message: format!("rule '{id}' is both selected and skipped"),
                });
            }
        }

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                issues.push(ValidationIssue::InvalidValue {
                    field: "logging.level",
                    message: format!("unknown level '{level}'"),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Directory scanned for workflow files when none are given
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Version requirement on `introduced_in`
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub skip: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidValue { field: &'static str, message: String },
    Conflict { message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
            ValidationIssue::Conflict { message } => write!(f, "conflicting settings: {message}"),
        }
    }
}
