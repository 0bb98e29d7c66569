//! `network.firewall` moved to `sandbox.agent`.
//!
//! `firewall: true` becomes `sandbox.agent: awf` unless an agent is already
//! configured. Any other scalar is simply dropped. Nested firewall blocks
//! from early previews are deleted outright.

use crate::codemod::rule::{Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{
    FrontmatterEdit, FrontmatterEditor, FrontmatterError, FrontmatterTree, InsertValue, KeyPath,
    Position,
};
use semver::Version;

const SANDBOX_AGENT: &str = "awf";

pub fn rule() -> Rule {
    Rule {
        id: "network-firewall-migration",
        name: "Migrate network.firewall to sandbox.agent",
        description: "Removes the deprecated network.firewall field; an enabled firewall is \
                      expressed as sandbox.agent: awf.",
        introduced_in: Version::new(0, 1, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    let Some(firewall) = tree.get(&["network", "firewall"]) else {
        return Ok(RuleOutput::unchanged(document));
    };

    let path = KeyPath::from_parts(["network", "firewall"]);
    let mut editor = FrontmatterEditor::new(document.frontmatter_text());

    if firewall.as_scalar().is_none() {
        editor.apply(&FrontmatterEdit::delete_subtree(path))?;
        return Ok(RuleOutput::from_editor(document, &editor));
    }

    editor.apply(&FrontmatterEdit::remove(path))?;

    if firewall.as_bool() == Some(true) && !tree.contains(&["sandbox", "agent"]) {
        match tree.get(&["sandbox"]) {
            None => {
                let sandbox = InsertValue::mapping([("agent", InsertValue::scalar(SANDBOX_AGENT))]);
                editor.apply(
                    &FrontmatterEdit::insert(KeyPath::root(), "sandbox", sandbox)
                        .at(Position::After("network".to_string())),
                )?;
            }
            Some(sandbox) if sandbox.is_null() || sandbox.as_mapping().is_some() => {
                editor.apply(&FrontmatterEdit::insert(
                    KeyPath::from_parts(["sandbox"]),
                    "agent",
                    InsertValue::scalar(SANDBOX_AGENT),
                ))?;
            }
            Some(_) => {
                tracing::debug!("sandbox is not a mapping; leaving it untouched");
            }
        }
    }

    Ok(RuleOutput::from_editor(document, &editor))
}
