use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "grep-tool-removal",
        name: "Remove tools.grep",
        description: "grep is built into every engine and no longer configured as a tool.",
        introduced_in: Version::new(0, 7, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["tools", "grep"]) {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(
        document,
        &[FrontmatterEdit::delete_subtree(KeyPath::from_parts([
            "tools", "grep",
        ]))],
    )
}
