use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterEditor, FrontmatterError, FrontmatterTree};
use semver::Version;
use std::fmt;

/// Rule body: decide from the tree, edit the document.
pub type ApplyFn = fn(&Document, &FrontmatterTree) -> Result<RuleOutput, FrontmatterError>;

/// A named, idempotent frontmatter migration.
#[derive(Clone)]
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Release of the workflow schema that made the legacy form obsolete
    pub introduced_in: Version,
    pub apply: ApplyFn,
}

impl Rule {
    pub fn run(
        &self,
        document: &Document,
        tree: &FrontmatterTree,
    ) -> Result<RuleOutput, FrontmatterError> {
        (self.apply)(document, tree)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("introduced_in", &self.introduced_in.to_string())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutput {
    pub document: Document,
    pub applied: bool,
}

impl RuleOutput {
    pub fn unchanged(document: &Document) -> Self {
        Self {
            document: document.clone(),
            applied: false,
        }
    }

    /// Wrap the editor's text back into the document when anything changed.
    pub fn from_editor(document: &Document, editor: &FrontmatterEditor) -> Self {
        if !editor.is_modified() {
            return Self::unchanged(document);
        }
        Self {
            document: document.with_frontmatter_text(editor.text()),
            applied: true,
        }
    }
}

/// Apply `edits` in order to the document's frontmatter.
pub fn edit_frontmatter(
    document: &Document,
    edits: &[FrontmatterEdit],
) -> Result<RuleOutput, FrontmatterError> {
    let mut editor = FrontmatterEditor::new(document.frontmatter_text());
    for edit in edits {
        editor.apply(edit)?;
    }
    Ok(RuleOutput::from_editor(document, &editor))
}
