use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "command-to-slash-command-migration",
        name: "Rename on.command to on.slash_command",
        description: "The command trigger was renamed to slash_command.",
        introduced_in: Version::new(0, 2, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["on", "command"]) || tree.contains(&["on", "slash_command"]) {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(
        document,
        &[FrontmatterEdit::rename(
            KeyPath::from_parts(["on", "command"]),
            "slash_command",
        )],
    )
}
