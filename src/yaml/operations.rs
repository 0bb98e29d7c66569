use crate::yaml::query::KeyPath;
use crate::yaml::tree::Scalar;

/// One structural change to the frontmatter.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterEdit {
    /// Remove an entry and its value lines; trailing sibling comments survive.
    RemoveKey { path: KeyPath },
    /// Change only the key token.
    RenameKey { path: KeyPath, new_name: String },
    InsertKey {
        parent: KeyPath,
        key: String,
        value: InsertValue,
        position: Position,
    },
    /// Union `items` into the sequence at `path`, creating it when absent.
    MergeScalarsIntoSequence { path: KeyPath, items: Vec<Scalar> },
    /// Remove an entry with every descendant line, comments included.
    DeleteSubtree { path: KeyPath },
    /// Replace the inline scalar value of an entry.
    SetScalar { path: KeyPath, value: Scalar },
}

impl FrontmatterEdit {
    pub fn remove(path: KeyPath) -> Self {
        FrontmatterEdit::RemoveKey { path }
    }

    pub fn rename(path: KeyPath, new_name: impl Into<String>) -> Self {
        FrontmatterEdit::RenameKey {
            path,
            new_name: new_name.into(),
        }
    }

    pub fn delete_subtree(path: KeyPath) -> Self {
        FrontmatterEdit::DeleteSubtree { path }
    }

    pub fn insert(parent: KeyPath, key: impl Into<String>, value: InsertValue) -> Self {
        FrontmatterEdit::InsertKey {
            parent,
            key: key.into(),
            value,
            position: Position::End,
        }
    }

    pub fn at(self, position: Position) -> Self {
        match self {
            FrontmatterEdit::InsertKey {
                parent, key, value, ..
            } => FrontmatterEdit::InsertKey {
                parent,
                key,
                value,
                position,
            },
            other => other,
        }
    }

    pub fn merge(path: KeyPath, items: Vec<Scalar>) -> Self {
        FrontmatterEdit::MergeScalarsIntoSequence { path, items }
    }

    pub fn set(path: KeyPath, value: impl Into<Scalar>) -> Self {
        FrontmatterEdit::SetScalar {
            path,
            value: value.into(),
        }
    }

    pub fn path(&self) -> &KeyPath {
        match self {
            FrontmatterEdit::RemoveKey { path }
            | FrontmatterEdit::RenameKey { path, .. }
            | FrontmatterEdit::MergeScalarsIntoSequence { path, .. }
            | FrontmatterEdit::DeleteSubtree { path }
            | FrontmatterEdit::SetScalar { path, .. } => path,
            FrontmatterEdit::InsertKey { parent, .. } => parent,
        }
    }
}

/// Value of a newly inserted key.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertValue {
    Scalar(Scalar),
    Sequence(Vec<Scalar>),
    Mapping(Vec<(String, InsertValue)>),
}

impl InsertValue {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        InsertValue::Scalar(value.into())
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, InsertValue)>) -> Self {
        InsertValue::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

/// Where an inserted key lands among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    End,
    /// Before the n-th existing child (and its leading comments)
    Index(usize),
    /// After the named sibling's full block; end of parent when it is absent
    After(String),
}
