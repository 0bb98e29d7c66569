//! Decoded, read-only view of the frontmatter used to decide whether a rule applies.

use crate::yaml::errors::FrontmatterError;
use crate::yaml::query::KeyPath;
use crate::yaml::scan;
use serde_yaml::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::String(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

/// Frontmatter decoded into scalars, sequences and ordered mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterTree {
    Scalar(Scalar),
    Sequence(Vec<FrontmatterTree>),
    /// Entries in source order
    Mapping(Vec<(String, FrontmatterTree)>),
}

impl FrontmatterTree {
    /// Decode frontmatter text. Blank or comment-only text is an empty mapping.
    pub fn parse(text: &str) -> Result<Self, FrontmatterError> {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let infos = scan::scan(&lines);

        if infos
            .iter()
            .all(|info| matches!(info.kind, scan::LineKind::Blank | scan::LineKind::Comment))
        {
            return Ok(FrontmatterTree::Mapping(Vec::new()));
        }

        let value: Value =
            serde_yaml::from_str(text).map_err(|err| FrontmatterError::MalformedYaml {
                message: err.to_string(),
            })?;

        if let Some((line, message)) = scan::find_unsupported(&lines, &infos) {
            return Err(FrontmatterError::UnsupportedYaml {
                message: format!("{message} (line {line})"),
            });
        }

        match convert(value)? {
            FrontmatterTree::Scalar(Scalar::Null) => Ok(FrontmatterTree::Mapping(Vec::new())),
            tree @ FrontmatterTree::Mapping(_) => Ok(tree),
            _ => Err(FrontmatterError::MalformedYaml {
                message: "frontmatter must be a mapping".to_string(),
            }),
        }
    }

    /// Look up a value by key components from this node.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&FrontmatterTree> {
        let mut node = self;
        for part in path {
            node = node.lookup(part.as_ref())?;
        }
        Some(node)
    }

    pub fn get_path(&self, path: &KeyPath) -> Option<&FrontmatterTree> {
        self.get(path.parts())
    }

    pub fn contains<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.get(path).is_some()
    }

    /// Direct child of a mapping node.
    pub fn lookup(&self, key: &str) -> Option<&FrontmatterTree> {
        self.as_mapping()?
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn as_mapping(&self) -> Option<&[(String, FrontmatterTree)]> {
        match self {
            FrontmatterTree::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[FrontmatterTree]> {
        match self {
            FrontmatterTree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            FrontmatterTree::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar()?.as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FrontmatterTree::Scalar(Scalar::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FrontmatterTree::Scalar(Scalar::Null))
    }

    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, FrontmatterTree::Mapping(entries) if entries.is_empty())
    }
}

fn convert(value: Value) -> Result<FrontmatterTree, FrontmatterError> {
    Ok(match value {
        Value::Null => FrontmatterTree::Scalar(Scalar::Null),
        Value::Bool(value) => FrontmatterTree::Scalar(Scalar::Bool(value)),
        Value::Number(number) => FrontmatterTree::Scalar(match number.as_i64() {
            Some(value) => Scalar::Integer(value),
            None => Scalar::Float(number.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::String(value) => FrontmatterTree::Scalar(Scalar::String(value)),
        Value::Sequence(items) => FrontmatterTree::Sequence(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = mapping_key(key)?;
                if key == "<<" {
                    return Err(FrontmatterError::UnsupportedYaml {
                        message: "merge keys (<<) are not supported".to_string(),
                    });
                }
                entries.push((key, convert(value)?));
            }
            FrontmatterTree::Mapping(entries)
        }
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            if !is_core_tag(&tag) {
                return Err(FrontmatterError::UnsupportedYaml {
                    message: format!("tag {tag} is not supported"),
                });
            }
            convert(tagged.value)?
        }
    })
}

fn mapping_key(key: Value) -> Result<String, FrontmatterError> {
    match key {
        Value::String(key) => Ok(key),
        Value::Bool(key) => Ok(key.to_string()),
        Value::Number(key) => Ok(key.to_string()),
        Value::Null => Ok("null".to_string()),
        _ => Err(FrontmatterError::UnsupportedYaml {
            message: "complex mapping keys are not supported".to_string(),
        }),
    }
}

fn is_core_tag(tag: &str) -> bool {
    let name = tag
        .strip_prefix("tag:yaml.org,2002:")
        .unwrap_or_else(|| tag.trim_start_matches('!'));
    matches!(name, "str" | "int" | "float" | "bool" | "null" | "map" | "seq")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nested_mapping_in_order() {
        let tree = FrontmatterTree::parse(
            "on: push\nnetwork:\n  firewall: true\n  allowed:\n    - a.com\n    - 'b.com'\ntimeout-minutes: 10\n",
        )
        .unwrap();

        let keys: Vec<&str> = tree
            .as_mapping()
            .unwrap()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, ["on", "network", "timeout-minutes"]);
        assert_eq!(tree.get(&["on"]).unwrap().as_str(), Some("push"));
        assert_eq!(tree.get(&["network", "firewall"]).unwrap().as_bool(), Some(true));
        let allowed = tree.get(&["network", "allowed"]).unwrap().as_sequence().unwrap();
        assert_eq!(allowed[1].as_str(), Some("b.com"));
        assert_eq!(
            tree.get(&["timeout-minutes"]).unwrap().as_scalar(),
            Some(&Scalar::Integer(10))
        );
    }

    #[test]
    fn yaml11_booleans_are_strings() {
        let tree = FrontmatterTree::parse("on: yes\noff: no\n").unwrap();
        assert_eq!(tree.get(&["on"]).unwrap().as_str(), Some("yes"));
        assert_eq!(tree.get(&["off"]).unwrap().as_str(), Some("no"));
    }

    #[test]
    fn empty_and_comment_only_are_empty_mappings() {
        assert!(FrontmatterTree::parse("").unwrap().is_empty_mapping());
        assert!(FrontmatterTree::parse("# only a comment\n\n").unwrap().is_empty_mapping());
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = FrontmatterTree::parse("on: [push\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::MalformedYaml { .. }));
        let err = FrontmatterTree::parse("- a\n- b\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::MalformedYaml { .. }));
    }

    #[test]
    fn anchors_are_unsupported() {
        let err = FrontmatterTree::parse("base: &b\n  x: 1\nother: *b\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::UnsupportedYaml { .. }));
    }

    #[test]
    fn custom_tags_are_unsupported() {
        let err = FrontmatterTree::parse("value: !custom x\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::UnsupportedYaml { .. }));
    }

    #[test]
    fn missing_paths() {
        let tree = FrontmatterTree::parse("network: defaults\n").unwrap();
        assert!(tree.get(&["network", "firewall"]).is_none());
        assert!(!tree.contains(&["sandbox"]));
        assert!(tree.contains(&["network"]));
    }
}
