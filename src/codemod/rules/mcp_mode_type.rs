use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "mcp-mode-to-type-migration",
        name: "Rename MCP server mode to type",
        description: "mcp-servers.<name>.mode is now spelled type.",
        introduced_in: Version::new(0, 6, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    let Some(servers) = tree.get(&["mcp-servers"]).and_then(FrontmatterTree::as_mapping) else {
        return Ok(RuleOutput::unchanged(document));
    };

    let edits: Vec<FrontmatterEdit> = servers
        .iter()
        .filter(|(_, server)| server.contains(&["mode"]) && !server.contains(&["type"]))
        .map(|(name, _)| {
            FrontmatterEdit::rename(
                KeyPath::from_parts(["mcp-servers", name.as_str(), "mode"]),
                "type",
            )
        })
        .collect();

    if edits.is_empty() {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(document, &edits)
}
