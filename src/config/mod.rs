pub mod loader;
pub mod schema;
pub mod version;

pub use loader::{discover, load_from_path, load_from_str, ConfigError, DEFAULT_CONFIG_FILE};
pub use schema::{FixConfig, LoggingSection, RunSection, ValidationError, ValidationIssue};
pub use version::{matches_requirement, parse_requirement, VersionError};
