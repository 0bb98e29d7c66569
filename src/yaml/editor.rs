//! Layout-preserving frontmatter editor.
//!
//! Every [`FrontmatterEdit`] is planned against the current line map and
//! compiled into a single [`Splice`]. Lines the edit does not target are
//! never rewritten, so comments, blank lines, quoting and key order survive.

use crate::splice::{Splice, SpliceResult};
use crate::yaml::emit::{self, Context};
use crate::yaml::errors::FrontmatterError;
use crate::yaml::operations::{FrontmatterEdit, InsertValue, Position};
use crate::yaml::query::KeyPath;
use crate::yaml::scan::{self, EntryLine, ItemLine, LineInfo, LineKind, ValueKind};
use crate::yaml::tree::{FrontmatterTree, Scalar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPlan {
    Splice(Splice),
    NoOp(String),
}

/// Half-open line range holding the children of a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scope {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Empty,
    Mapping { column: usize },
    Sequence { column: usize },
    Other,
}

/// Where the next path segment is looked up.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Scope(Scope),
    /// Item line whose compact mapping holds the next key
    Item(usize),
}

/// Where new children of a mapping go.
#[derive(Debug, Clone, Copy)]
struct Container {
    scope: Scope,
    /// Column of existing children
    column: Option<usize>,
    /// Column for the first child when there are none yet
    default_column: usize,
}

#[derive(Debug, Clone)]
pub struct FrontmatterEditor {
    lines: Vec<String>,
    infos: Vec<LineInfo>,
    newline: &'static str,
    modified: bool,
}

impl FrontmatterEditor {
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let newline = match lines.iter().find(|line| line.ends_with('\n')) {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        };
        let infos = scan::scan(&lines);
        Self {
            lines,
            infos,
            newline,
            modified: false,
        }
    }

    pub fn text(&self) -> String {
        self.lines.concat()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Decode the current text. Re-derived on every call so it never lags edits.
    pub fn tree(&self) -> Result<FrontmatterTree, FrontmatterError> {
        FrontmatterTree::parse(&self.text())
    }

    /// Whether `path` names an entry in the current text.
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.resolve(path).is_ok()
    }

    /// Apply one edit. Returns `false` when the edit turned out to be a no-op.
    pub fn apply(&mut self, edit: &FrontmatterEdit) -> Result<bool, FrontmatterError> {
        match self.plan(edit)? {
            EditPlan::NoOp(reason) => {
                tracing::trace!(%reason, path = %edit.path(), "edit is a no-op");
                Ok(false)
            }
            EditPlan::Splice(splice) => match splice.apply(&mut self.lines)? {
                SpliceResult::AlreadyApplied => Ok(false),
                SpliceResult::Applied { .. } => {
                    self.infos = scan::scan(&self.lines);
                    self.modified = true;
                    Ok(true)
                }
            },
        }
    }

    pub fn plan(&self, edit: &FrontmatterEdit) -> Result<EditPlan, FrontmatterError> {
        match edit {
            FrontmatterEdit::RemoveKey { path } => self.plan_remove(path, false),
            FrontmatterEdit::DeleteSubtree { path } => self.plan_remove(path, true),
            FrontmatterEdit::RenameKey { path, new_name } => self.plan_rename(path, new_name),
            FrontmatterEdit::InsertKey {
                parent,
                key,
                value,
                position,
            } => self.plan_insert(parent, key, value, position),
            FrontmatterEdit::MergeScalarsIntoSequence { path, items } => {
                self.plan_merge(path, items)
            }
            FrontmatterEdit::SetScalar { path, value } => self.plan_set(path, value),
        }
    }

    fn plan_remove(&self, path: &KeyPath, subtree: bool) -> Result<EditPlan, FrontmatterError> {
        let idx = self.resolve(path)?;
        if matches!(self.infos[idx].kind, LineKind::Item(_)) {
            return Err(FrontmatterError::UnsupportedYaml {
                message: format!("{path} opens a compact sequence item"),
            });
        }
        let end = if subtree {
            self.block_end(idx)
        } else {
            self.value_end(idx)
        };
        Ok(EditPlan::Splice(Splice::new(&self.lines, idx, end, Vec::new())))
    }

    fn plan_rename(&self, path: &KeyPath, new_name: &str) -> Result<EditPlan, FrontmatterError> {
        let idx = self.resolve(path)?;
        let entry = self.entry(idx)?;
        if entry.key == new_name {
            return Ok(EditPlan::NoOp(format!("key already named {new_name}")));
        }

        let parent = path.parent().unwrap_or_default();
        let container = self.container(&parent)?;
        if self
            .children(&container)
            .into_iter()
            .any(|child| self.key_of(child) == Some(new_name))
        {
            return Err(FrontmatterError::DuplicateKey {
                parent: parent.to_string(),
                key: new_name.to_string(),
            });
        }

        let line = &self.lines[idx];
        let renamed = format!(
            "{}{}{}",
            &line[..entry.key_start],
            emit::key(new_name),
            &line[entry.key_end..]
        );
        Ok(EditPlan::Splice(Splice::new(
            &self.lines,
            idx,
            idx + 1,
            vec![renamed],
        )))
    }

    fn plan_insert(
        &self,
        parent: &KeyPath,
        key: &str,
        value: &InsertValue,
        position: &Position,
    ) -> Result<EditPlan, FrontmatterError> {
        let container = self.container(parent)?;
        let children = self.children(&container);
        if children
            .iter()
            .any(|&child| self.key_of(child) == Some(key))
        {
            return Err(FrontmatterError::DuplicateKey {
                parent: parent.to_string(),
                key: key.to_string(),
            });
        }

        let column = container.column.unwrap_or(container.default_column);
        let mut new_lines = Vec::new();
        self.render_entry(column, key, value, &mut new_lines);

        let end = container.scope.end;
        let at = match position {
            Position::End => end,
            Position::Index(n) => children
                .get(*n)
                .map(|&child| self.leading_comments_start(child))
                .unwrap_or(end),
            Position::After(sibling) => children
                .iter()
                .find(|&&child| self.key_of(child) == Some(sibling.as_str()))
                .map(|&child| self.block_end(child))
                .unwrap_or(end),
        };

        Ok(EditPlan::Splice(self.insertion(at, new_lines)))
    }

    fn plan_merge(&self, path: &KeyPath, items: &[Scalar]) -> Result<EditPlan, FrontmatterError> {
        let idx = match self.resolve(path) {
            Ok(idx) => idx,
            Err(FrontmatterError::PathNotFound { .. }) => {
                return self.plan_create_sequence(path, dedup(items, &[]));
            }
            Err(err) => return Err(err),
        };

        let existing = match self.tree()?.get_path(path) {
            Some(FrontmatterTree::Sequence(values)) => values
                .iter()
                .map(|value| match value {
                    FrontmatterTree::Scalar(scalar) => Ok(scalar.clone()),
                    _ => Err(FrontmatterError::PathTypeMismatch {
                        path: path.to_string(),
                        expected: "sequence of scalars",
                        found: "nested collection",
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(FrontmatterTree::Scalar(Scalar::Null)) | None => Vec::new(),
            Some(FrontmatterTree::Scalar(_)) => return Err(mismatch(path, "sequence", "scalar")),
            Some(FrontmatterTree::Mapping(_)) => {
                return Err(mismatch(path, "sequence", "mapping"))
            }
        };

        let missing = dedup(items, &existing);
        if missing.is_empty() {
            return Ok(EditPlan::NoOp(format!("{path} already contains every item")));
        }

        let entry = self.entry(idx)?;
        match entry.value {
            ValueKind::FlowSequence => self.plan_flow_append(path, idx, entry, &missing),
            ValueKind::Empty => {
                let scope = self.child_scope(idx);
                match self.shape(scope) {
                    Shape::Sequence { column } => Ok(EditPlan::Splice(
                        self.insertion(scope.end, self.item_lines(column, &missing)),
                    )),
                    Shape::Empty => Ok(EditPlan::Splice(self.insertion(
                        idx + 1,
                        self.item_lines(entry.column() + 2, &missing),
                    ))),
                    Shape::Mapping { .. } => Err(mismatch(path, "sequence", "mapping")),
                    Shape::Other => Err(mismatch(path, "sequence", "unsupported value")),
                }
            }
            // An explicit null (`key: ~`): drop the token and start a block sequence.
            ValueKind::Scalar => {
                let line = &self.lines[idx];
                let text = scan::content(line);
                let mut header = text[..=entry.colon].to_string();
                if let Some(comment) = entry.comment_start {
                    header.push(' ');
                    header.push_str(&text[comment..]);
                }
                header.push_str(&line[text.len()..]);
                let mut replacement = vec![header];
                replacement.extend(self.item_lines(entry.column() + 2, &missing));
                Ok(EditPlan::Splice(Splice::new(
                    &self.lines,
                    idx,
                    idx + 1,
                    replacement,
                )))
            }
            other => Err(mismatch(path, "sequence", other.describe())),
        }
    }

    fn plan_flow_append(
        &self,
        path: &KeyPath,
        idx: usize,
        entry: &EntryLine,
        missing: &[Scalar],
    ) -> Result<EditPlan, FrontmatterError> {
        let line = &self.lines[idx];
        let token = &line[entry.value_start..entry.value_end];
        let Some(inner) = token
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            return Err(FrontmatterError::UnsupportedYaml {
                message: format!("flow sequence at {path} spans several lines"),
            });
        };

        let added: Vec<String> = missing
            .iter()
            .map(|item| emit::scalar(item, Context::Flow))
            .collect();
        let kept = inner.trim_end().trim_end_matches(',').trim_end();
        let rewritten = if kept.trim().is_empty() {
            format!("[{}]", added.join(", "))
        } else {
            format!("[{kept}, {}]", added.join(", "))
        };

        let updated = format!(
            "{}{}{}",
            &line[..entry.value_start],
            rewritten,
            &line[entry.value_end..]
        );
        Ok(EditPlan::Splice(Splice::new(
            &self.lines,
            idx,
            idx + 1,
            vec![updated],
        )))
    }

    /// Create `path` as a block sequence under its nearest existing ancestor.
    fn plan_create_sequence(
        &self,
        path: &KeyPath,
        items: Vec<Scalar>,
    ) -> Result<EditPlan, FrontmatterError> {
        let mut depth = path.len().saturating_sub(1);
        while depth > 0 {
            match self.resolve(&path.prefix(depth)) {
                Ok(_) => break,
                Err(FrontmatterError::PathNotFound { .. }) => depth -= 1,
                Err(err) => return Err(err),
            }
        }

        let parts = path.parts();
        let mut value = InsertValue::Sequence(items);
        for part in parts[depth + 1..].iter().rev() {
            value = InsertValue::Mapping(vec![(part.clone(), value)]);
        }
        self.plan_insert(&path.prefix(depth), &parts[depth], &value, &Position::End)
    }

    fn plan_set(&self, path: &KeyPath, value: &Scalar) -> Result<EditPlan, FrontmatterError> {
        let idx = self.resolve(path)?;
        let entry = self.entry(idx)?;
        let line = &self.lines[idx];
        let token = &line[entry.value_start..entry.value_end];
        let rendered = match value {
            Scalar::String(text) if entry.value == ValueKind::Scalar => {
                emit::quoted_like(text, token).unwrap_or_else(|| emit::scalar(value, Context::Block))
            }
            _ => emit::scalar(value, Context::Block),
        };

        let updated = match entry.value {
            ValueKind::Scalar => {
                if token == rendered {
                    return Ok(EditPlan::NoOp(format!("{path} already set")));
                }
                format!(
                    "{}{}{}",
                    &line[..entry.value_start],
                    rendered,
                    &line[entry.value_end..]
                )
            }
            ValueKind::Empty => {
                if self.entry_end(idx) > idx + 1 {
                    return Err(mismatch(path, "scalar", "block collection"));
                }
                format!(
                    "{} {}{}",
                    &line[..=entry.colon],
                    rendered,
                    &line[entry.colon + 1..]
                )
            }
            other => return Err(mismatch(path, "scalar", other.describe())),
        };

        Ok(EditPlan::Splice(Splice::new(
            &self.lines,
            idx,
            idx + 1,
            vec![updated],
        )))
    }

    /// Line index of the entry named by `path`. Numeric segments index into
    /// block sequences, so `on.schedule.0.cron` names the `cron` key of the
    /// first schedule item.
    fn resolve(&self, path: &KeyPath) -> Result<usize, FrontmatterError> {
        if path.is_root() {
            return Err(FrontmatterError::InvalidKeyPath {
                input: String::new(),
                message: "the root is not an entry".to_string(),
            });
        }
        let not_found = || FrontmatterError::PathNotFound {
            path: path.to_string(),
        };

        let mut cursor = Cursor::Scope(self.root_scope());
        let mut found = 0;
        for (depth, part) in path.parts().iter().enumerate() {
            let (idx, indexed) = match cursor {
                Cursor::Item(item) => (self.find_in_item(item, part), false),
                Cursor::Scope(scope) => match self.shape(scope) {
                    Shape::Mapping { column } => (self.find_key(scope, column, part), false),
                    Shape::Sequence { column } => {
                        let index = part
                            .parse::<usize>()
                            .map_err(|_| mismatch(&path.prefix(depth), "mapping", "sequence"))?;
                        (self.find_item(scope, column, index), true)
                    }
                    Shape::Empty => (None, false),
                    Shape::Other => {
                        return Err(mismatch(&path.prefix(depth), "mapping", "unsupported value"))
                    }
                },
            };
            found = idx.ok_or_else(not_found)?;

            if depth + 1 == path.len() {
                break;
            }
            let next = path.prefix(depth + 1);
            cursor = match &self.infos[found].kind {
                LineKind::Item(item) if indexed => match (&item.entry, item.value) {
                    (Some(_), _) => Cursor::Item(found),
                    (None, ValueKind::Empty) => Cursor::Scope(Scope {
                        start: found + 1,
                        end: self.block_end(found),
                    }),
                    (None, value) => return Err(mismatch(&next, "mapping", value.describe())),
                },
                _ => {
                    let entry = self.entry(found)?;
                    if entry.value != ValueKind::Empty {
                        return Err(mismatch(&next, "mapping", entry.value.describe()));
                    }
                    Cursor::Scope(self.child_scope(found))
                }
            };
        }
        Ok(found)
    }

    fn find_key(&self, scope: Scope, column: usize, key: &str) -> Option<usize> {
        (scope.start..scope.end)
            .find(|&idx| self.infos[idx].indent == column && self.key_of(idx) == Some(key))
    }

    /// The `index`th item of a block sequence.
    fn find_item(&self, scope: Scope, column: usize, index: usize) -> Option<usize> {
        (scope.start..scope.end)
            .filter(|&idx| {
                self.infos[idx].indent == column && matches!(self.infos[idx].kind, LineKind::Item(_))
            })
            .nth(index)
    }

    /// Key of the compact mapping started on item line `idx` (`- cron: ...`).
    fn find_in_item(&self, idx: usize, key: &str) -> Option<usize> {
        let LineKind::Item(ItemLine {
            entry: Some(first), ..
        }) = &self.infos[idx].kind
        else {
            return None;
        };
        if first.key == key {
            return Some(idx);
        }
        let column = first.column();
        (idx + 1..self.block_end(idx))
            .find(|&line| self.infos[line].indent == column && self.key_of(line) == Some(key))
    }

    fn container(&self, parent: &KeyPath) -> Result<Container, FrontmatterError> {
        let (scope, default_column) = if parent.is_root() {
            (self.root_scope(), 0)
        } else {
            let idx = self.resolve(parent)?;
            if matches!(self.infos[idx].kind, LineKind::Item(_)) {
                return Err(FrontmatterError::UnsupportedYaml {
                    message: format!("cannot add keys to the compact sequence item at {parent}"),
                });
            }
            let entry = self.entry(idx)?;
            if entry.value != ValueKind::Empty {
                return Err(FrontmatterError::CannotInsertIntoScalar {
                    path: parent.to_string(),
                });
            }
            (self.child_scope(idx), entry.column() + 2)
        };

        let column = match self.shape(scope) {
            Shape::Mapping { column } => Some(column),
            Shape::Empty => None,
            Shape::Sequence { .. } => return Err(mismatch(parent, "mapping", "sequence")),
            Shape::Other => return Err(mismatch(parent, "mapping", "unsupported value")),
        };

        Ok(Container {
            scope,
            column,
            default_column,
        })
    }

    fn children(&self, container: &Container) -> Vec<usize> {
        let Some(column) = container.column else {
            return Vec::new();
        };
        (container.scope.start..container.scope.end)
            .filter(|&idx| self.infos[idx].indent == column && self.key_of(idx).is_some())
            .collect()
    }

    fn root_scope(&self) -> Scope {
        let end = self
            .infos
            .iter()
            .rposition(|info| info.kind != LineKind::Blank)
            .map_or(0, |idx| idx + 1);
        Scope { start: 0, end }
    }

    fn child_scope(&self, idx: usize) -> Scope {
        Scope {
            start: idx + 1,
            end: self.entry_end(idx),
        }
    }

    fn shape(&self, scope: Scope) -> Shape {
        let first = (scope.start..scope.end)
            .map(|idx| &self.infos[idx])
            .find(|info| !matches!(info.kind, LineKind::Blank | LineKind::Comment));
        match first {
            None => Shape::Empty,
            Some(info) => match info.kind {
                LineKind::Entry(_) => Shape::Mapping {
                    column: info.indent,
                },
                LineKind::Item(_) => Shape::Sequence {
                    column: info.indent,
                },
                _ => Shape::Other,
            },
        }
    }

    /// End of the block started at `idx`: its value lines, children and any
    /// deeper comments, without trailing blank lines. An item's block ends at
    /// the next item of the same sequence.
    fn block_end(&self, idx: usize) -> usize {
        match &self.infos[idx].kind {
            LineKind::Entry(entry) => {
                self.span_end(idx, entry.column(), entry.value == ValueKind::Empty)
            }
            LineKind::Item(item) => self.span_end(idx, item.dash, false),
            _ => idx + 1,
        }
    }

    /// Like [`Self::block_end`], but for a compact entry on an item line it
    /// covers only that entry's own value.
    fn entry_end(&self, idx: usize) -> usize {
        match &self.infos[idx].kind {
            LineKind::Item(ItemLine {
                entry: Some(entry), ..
            }) => self.span_end(idx, entry.column(), entry.value == ValueKind::Empty),
            _ => self.block_end(idx),
        }
    }

    /// Lines after `idx` indented past `column`. Blank lines and comments at
    /// or left of `column` only count when a later line belongs.
    fn span_end(&self, idx: usize, column: usize, nests_items: bool) -> usize {
        let mut end = idx + 1;
        for (offset, info) in self.infos[idx + 1..].iter().enumerate() {
            let belongs = match info.kind {
                LineKind::Blank => continue,
                LineKind::Comment if info.indent <= column => continue,
                LineKind::Continuation => true,
                LineKind::Item(_) => {
                    info.indent > column || (info.indent == column && nests_items)
                }
                LineKind::Comment | LineKind::Entry(_) | LineKind::Other => info.indent > column,
            };
            if !belongs {
                break;
            }
            end = idx + 1 + offset + 1;
        }
        end
    }

    /// Lines removed along with the entry at `idx`. A block value takes its
    /// whole child block; a scalar leaves trailing comment lines in place.
    fn value_end(&self, idx: usize) -> usize {
        let block_end = self.block_end(idx);
        if matches!(self.entry(idx), Ok(entry) if entry.value == ValueKind::Empty) {
            return block_end;
        }
        (idx..block_end)
            .rev()
            .find(|&line| !matches!(self.infos[line].kind, LineKind::Comment))
            .map_or(idx + 1, |line| line + 1)
    }

    /// First line of the comment block directly above `idx`.
    fn leading_comments_start(&self, idx: usize) -> usize {
        let mut start = idx;
        while start > 0 && self.infos[start - 1].kind == LineKind::Comment {
            start -= 1;
        }
        start
    }

    fn entry(&self, idx: usize) -> Result<&EntryLine, FrontmatterError> {
        match &self.infos[idx].kind {
            LineKind::Entry(entry)
            | LineKind::Item(ItemLine {
                entry: Some(entry), ..
            }) => Ok(entry),
            _ => Err(FrontmatterError::UnsupportedYaml {
                message: format!("line {} is not a mapping entry", idx + 1),
            }),
        }
    }

    fn key_of(&self, idx: usize) -> Option<&str> {
        match &self.infos[idx].kind {
            LineKind::Entry(entry) => Some(&entry.key),
            _ => None,
        }
    }

    /// Insert `new_lines` before line `at`, terminating the previous line if needed.
    fn insertion(&self, at: usize, new_lines: Vec<String>) -> Splice {
        match at.checked_sub(1).map(|prev| &self.lines[prev]) {
            Some(prev) if !prev.ends_with('\n') => {
                let mut replacement = vec![format!("{prev}{}", self.newline)];
                replacement.extend(new_lines);
                Splice::new(&self.lines, at - 1, at, replacement)
            }
            _ => Splice::insert(at, new_lines),
        }
    }

    fn item_lines(&self, column: usize, items: &[Scalar]) -> Vec<String> {
        let pad = " ".repeat(column);
        items
            .iter()
            .map(|item| {
                format!(
                    "{pad}- {}{}",
                    emit::scalar(item, Context::Block),
                    self.newline
                )
            })
            .collect()
    }

    fn render_entry(&self, column: usize, key: &str, value: &InsertValue, out: &mut Vec<String>) {
        let pad = " ".repeat(column);
        let key = emit::key(key);
        let nl = self.newline;
        match value {
            InsertValue::Scalar(scalar) => {
                out.push(format!(
                    "{pad}{key}: {}{nl}",
                    emit::scalar(scalar, Context::Block)
                ));
            }
            InsertValue::Sequence(items) if items.is_empty() => {
                out.push(format!("{pad}{key}: []{nl}"));
            }
            InsertValue::Sequence(items) => {
                out.push(format!("{pad}{key}:{nl}"));
                out.extend(self.item_lines(column + 2, items));
            }
            InsertValue::Mapping(entries) if entries.is_empty() => {
                out.push(format!("{pad}{key}: {{}}{nl}"));
            }
            InsertValue::Mapping(entries) => {
                out.push(format!("{pad}{key}:{nl}"));
                for (child, value) in entries {
                    self.render_entry(column + 2, child, value, out);
                }
            }
        }
    }
}

fn mismatch(path: &KeyPath, expected: &'static str, found: &'static str) -> FrontmatterError {
    FrontmatterError::PathTypeMismatch {
        path: path.to_string(),
        expected,
        found,
    }
}

/// Items not already in `existing`, deduplicated, in order of first appearance.
fn dedup(items: &[Scalar], existing: &[Scalar]) -> Vec<Scalar> {
    let mut seen: Vec<String> = existing.iter().map(ToString::to_string).collect();
    let mut out = Vec::new();
    for item in items {
        let key = item.to_string();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(item.clone());
        }
    }
    out
}
