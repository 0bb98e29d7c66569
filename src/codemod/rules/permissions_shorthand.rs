use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "permissions-read-to-read-all",
        name: "Convert invalid permissions shorthand",
        description: "GitHub Actions only accepts read-all and write-all as permission \
                      shorthands.",
        introduced_in: Version::new(0, 5, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    let replacement = match tree.get(&["permissions"]).and_then(FrontmatterTree::as_str) {
        Some("read") => "read-all",
        Some("write") => "write-all",
        _ => return Ok(RuleOutput::unchanged(document)),
    };
    edit_frontmatter(
        document,
        &[FrontmatterEdit::set(
            KeyPath::from_parts(["permissions"]),
            replacement,
        )],
    )
}
