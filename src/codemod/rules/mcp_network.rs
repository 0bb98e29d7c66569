//! Per-server `network.allowed` lists under `mcp-servers` are hoisted into
//! the workflow's top-level `network.allowed`.

use crate::codemod::rule::{Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{
    FrontmatterEdit, FrontmatterEditor, FrontmatterError, FrontmatterTree, KeyPath, Scalar,
};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "mcp-network-to-top-level-migration",
        name: "Migrate MCP network config to top-level",
        description: "Moves mcp-servers.<name>.network.allowed domains into the top-level \
                      network.allowed list and drops the per-server network blocks.",
        introduced_in: Version::new(0, 6, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    let Some(servers) = tree.get(&["mcp-servers"]).and_then(FrontmatterTree::as_mapping) else {
        return Ok(RuleOutput::unchanged(document));
    };

    let mut hoisted = Vec::new();
    let mut migrated = Vec::new();
    for (name, server) in servers {
        let Some(allowed) = server
            .get(&["network", "allowed"])
            .and_then(FrontmatterTree::as_sequence)
        else {
            continue;
        };
        let domains: Option<Vec<Scalar>> = allowed
            .iter()
            .map(|item| item.as_scalar().cloned())
            .collect();
        match domains {
            Some(domains) if !domains.is_empty() => {
                hoisted.extend(domains);
                migrated.push(name.as_str());
            }
            _ => continue,
        }
    }

    if migrated.is_empty() {
        return Ok(RuleOutput::unchanged(document));
    }

    // A scalar top-level network (`network: defaults`) has no list to merge into.
    if let Some(network) = tree.get(&["network"]) {
        if !network.is_null() && network.as_mapping().is_none() {
            tracing::debug!("top-level network is not a mapping; skipping MCP network migration");
            return Ok(RuleOutput::unchanged(document));
        }
    }

    let mut editor = FrontmatterEditor::new(document.frontmatter_text());
    editor.apply(&FrontmatterEdit::merge(
        KeyPath::from_parts(["network", "allowed"]),
        hoisted,
    ))?;
    for name in migrated {
        editor.apply(&FrontmatterEdit::delete_subtree(KeyPath::from_parts([
            "mcp-servers",
            name,
            "network",
        ])))?;
    }

    Ok(RuleOutput::from_editor(document, &editor))
}
