use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "safe-inputs-mode-removal",
        name: "Remove deprecated safe-inputs.mode field",
        description: "HTTP is the only safe-inputs transport, so the mode field is removed.",
        introduced_in: Version::new(0, 2, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["safe-inputs", "mode"]) {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(
        document,
        &[FrontmatterEdit::remove(KeyPath::from_parts([
            "safe-inputs",
            "mode",
        ]))],
    )
}
