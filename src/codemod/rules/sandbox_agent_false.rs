use crate::codemod::rule::{Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterEditor, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "sandbox-agent-false-removal",
        name: "Remove deprecated sandbox.agent: false",
        description: "Disabling the agent sandbox is no longer supported; the field is removed \
                      along with a sandbox block left empty.",
        introduced_in: Version::new(0, 5, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if tree.get(&["sandbox", "agent"]).and_then(FrontmatterTree::as_bool) != Some(false) {
        return Ok(RuleOutput::unchanged(document));
    }

    let mut editor = FrontmatterEditor::new(document.frontmatter_text());
    editor.apply(&FrontmatterEdit::remove(KeyPath::from_parts([
        "sandbox", "agent",
    ])))?;

    let sandbox_left_empty = editor
        .tree()?
        .get(&["sandbox"])
        .is_some_and(|sandbox| sandbox.is_null() || sandbox.is_empty_mapping());
    if sandbox_left_empty {
        editor.apply(&FrontmatterEdit::delete_subtree(KeyPath::from_parts([
            "sandbox",
        ])))?;
    }

    Ok(RuleOutput::from_editor(document, &editor))
}
