use crate::splice::SpliceError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrontmatterError {
    #[error("frontmatter opened on line {line} is never closed")]
    MalformedFrontmatter { line: usize },

    #[error("invalid YAML in frontmatter: {message}")]
    MalformedYaml { message: String },

    #[error("unsupported YAML construct: {message}")]
    UnsupportedYaml { message: String },

    #[error("path not found: {path}")]
    PathNotFound { path: String },

    #[error("expected {expected} at {path}, found {found}")]
    PathTypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot insert under {path}: value is a scalar or flow collection")]
    CannotInsertIntoScalar { path: String },

    #[error("key '{key}' already exists under {parent}")]
    DuplicateKey { parent: String, key: String },

    #[error("invalid key path '{input}': {message}")]
    InvalidKeyPath { input: String, message: String },

    #[error("splice error: {0}")]
    Splice(#[from] SpliceError),
}

impl FrontmatterError {
    /// Errors that mean the frontmatter cannot be decoded at all.
    ///
    /// Files failing this way are skipped with a warning rather than failed.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            FrontmatterError::MalformedYaml { .. } | FrontmatterError::UnsupportedYaml { .. }
        )
    }
}
