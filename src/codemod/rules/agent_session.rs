use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "agent-task-to-agent-session-migration",
        name: "Migrate create-agent-task to create-agent-session",
        description: "Renames safe-outputs.create-agent-task to create-agent-session, keeping \
                      its configuration.",
        introduced_in: Version::new(0, 4, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["safe-outputs", "create-agent-task"])
        || tree.contains(&["safe-outputs", "create-agent-session"])
    {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(
        document,
        &[FrontmatterEdit::rename(
            KeyPath::from_parts(["safe-outputs", "create-agent-task"]),
            "create-agent-session",
        )],
    )
}
