use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use semver::Version;

pub fn rule() -> Rule {
    Rule {
        id: "timeout-minutes-migration",
        name: "Rename timeout_minutes to timeout-minutes",
        description: "Replaces the underscore spelling of the top-level timeout with the \
                      hyphenated key used by every other workflow field.",
        introduced_in: Version::new(0, 1, 0),
        apply,
    }
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    if !tree.contains(&["timeout_minutes"]) {
        return Ok(RuleOutput::unchanged(document));
    }

    let legacy = KeyPath::from_parts(["timeout_minutes"]);
    // The hyphenated key wins when both spellings are present.
    let edit = if tree.contains(&["timeout-minutes"]) {
        FrontmatterEdit::remove(legacy)
    } else {
        FrontmatterEdit::rename(legacy, "timeout-minutes")
    };
    edit_frontmatter(document, &[edit])
}
