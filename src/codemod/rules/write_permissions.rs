//! Workflows no longer request write access directly.
//!
//! `permissions: write-all` becomes `read-all`, the `write` shorthand becomes
//! `read`, and each `permissions.<scope>: write` becomes `read`. Write access
//! is granted through safe outputs instead.

use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "write-permissions-to-read-migration",
        name: "Convert write permissions to read",
        description: "Agent jobs run with read-only permissions; writes go through safe \
                      outputs.",
        introduced_in: Version::new(0, 4, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    let edits: Vec<FrontmatterEdit> = match tree.get(&["permissions"]) {
        Some(FrontmatterTree::Mapping(scopes)) => scopes
            .iter()
            .filter(|(_, level)| level.as_str() == Some("write"))
            .map(|(scope, _)| {
                FrontmatterEdit::set(KeyPath::from_parts(["permissions", scope.as_str()]), "read")
            })
            .collect(),
        Some(shorthand) => match shorthand.as_str() {
            Some("write-all") => vec![FrontmatterEdit::set(
                KeyPath::from_parts(["permissions"]),
                "read-all",
            )],
            Some("write") => vec![FrontmatterEdit::set(
                KeyPath::from_parts(["permissions"]),
                "read",
            )],
            _ => Vec::new(),
        },
        None => Vec::new(),
    };

    if edits.is_empty() {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(document, &edits)
}
