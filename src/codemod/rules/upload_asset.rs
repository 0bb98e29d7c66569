use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "upload-assets-to-upload-asset-migration",
        name: "Rename safe-outputs.upload-assets to upload-asset",
        description: "Safe output names are singular; upload-assets becomes upload-asset.",
        introduced_in: Version::new(0, 3, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["safe-outputs", "upload-assets"])
        || tree.contains(&["safe-outputs", "upload-asset"])
    {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(
        document,
        &[FrontmatterEdit::rename(
            KeyPath::from_parts(["safe-outputs", "upload-assets"]),
            "upload-asset",
        )],
    )
}
