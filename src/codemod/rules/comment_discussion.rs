use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "add-comment-discussion-removal",
        name: "Remove safe-outputs.add-comment.discussion",
        description: "add-comment detects discussions from the triggering event; the explicit \
                      flag is obsolete.",
        introduced_in: Version::new(0, 3, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["safe-outputs", "add-comment", "discussion"]) {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(
        document,
        &[FrontmatterEdit::remove(KeyPath::from_parts([
            "safe-outputs",
            "add-comment",
            "discussion",
        ]))],
    )
}
