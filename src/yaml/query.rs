use crate::yaml::errors::FrontmatterError;
use std::fmt;

/// Path of mapping keys from the frontmatter root, e.g. `safe-outputs.create-agent-task`.
///
/// The empty path names the root mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    parts: Vec<String>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse dotted text. Components containing dots or spaces are quoted:
    /// `mcp-servers."my.server"`.
    pub fn parse(input: &str) -> Result<Self, FrontmatterError> {
        let parts = parse_dotted_path(input)?;
        if parts.is_empty() {
            return Err(FrontmatterError::InvalidKeyPath {
                input: input.to_string(),
                message: "empty key path".to_string(),
            });
        }
        Ok(Self { parts })
    }

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<KeyPath> {
        if self.parts.is_empty() {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, key: impl Into<String>) -> KeyPath {
        let mut parts = self.parts.clone();
        parts.push(key.into());
        Self { parts }
    }

    /// The first `len` components.
    pub fn prefix(&self, len: usize) -> KeyPath {
        Self {
            parts: self.parts[..len.min(self.parts.len())].to_vec(),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            return write!(f, "<root>");
        }
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                write!(f, ".")?;
            }
            if part.is_empty() || part.contains(['.', '"', '\'']) || part.contains(char::is_whitespace)
            {
                write!(f, "\"{}\"", part.replace('\\', "\\\\").replace('"', "\\\""))?;
            } else {
                write!(f, "{part}")?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for KeyPath {
    type Err = FrontmatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_dotted_path(input: &str) -> Result<Vec<String>, FrontmatterError> {
    let invalid = |message: &str| FrontmatterError::InvalidKeyPath {
        input: input.to_string(),
        message: message.to_string(),
    };

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted_segment = false;
    let mut chars = input.chars();
    let mut in_quotes = false;
    let mut quote_char = '\0';

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == quote_char {
                in_quotes = false;
                continue;
            }
            if quote_char == '"' && ch == '\\' {
                if let Some(next) = chars.next() {
                    current.push(match next {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    continue;
                }
            }
            current.push(ch);
            continue;
        }

        match ch {
            '.' => {
                if current.is_empty() && !quoted_segment {
                    return Err(invalid("empty path segment"));
                }
                parts.push(std::mem::take(&mut current));
                quoted_segment = false;
            }
            '"' | '\'' => {
                if !current.is_empty() || quoted_segment {
                    return Err(invalid("unexpected quote inside key"));
                }
                in_quotes = true;
                quoted_segment = true;
                quote_char = ch;
            }
            ch if ch.is_whitespace() => {
                return Err(invalid("whitespace must be quoted"));
            }
            other => {
                if quoted_segment {
                    return Err(invalid("text after closing quote"));
                }
                current.push(other)
            }
        }
    }

    if in_quotes {
        return Err(invalid("unterminated quoted key"));
    }

    if !current.is_empty() || quoted_segment {
        parts.push(current);
    } else if !parts.is_empty() {
        return Err(invalid("trailing dot"));
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dotted() {
        let path = KeyPath::parse("safe-outputs.create-agent-task").unwrap();
        assert_eq!(path.parts(), &["safe-outputs", "create-agent-task"]);
        assert_eq!(path.to_string(), "safe-outputs.create-agent-task");
    }

    #[test]
    fn parse_quoted_segment() {
        let path = KeyPath::parse("mcp-servers.\"my.server\".network").unwrap();
        assert_eq!(path.parts(), &["mcp-servers", "my.server", "network"]);
        assert_eq!(path.to_string(), "mcp-servers.\"my.server\".network");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(KeyPath::parse("").is_err());
        assert!(KeyPath::parse("a..b").is_err());
        assert!(KeyPath::parse("a.").is_err());
        assert!(KeyPath::parse("a.\"b").is_err());
        assert!(KeyPath::parse("a b").is_err());
    }

    #[test]
    fn parent_and_child() {
        let path = KeyPath::parse("network.firewall").unwrap();
        assert_eq!(path.parent().unwrap(), KeyPath::parse("network").unwrap());
        assert_eq!(path.parent().unwrap().parent().unwrap(), KeyPath::root());
        assert!(KeyPath::root().parent().is_none());
        assert_eq!(KeyPath::root().child("sandbox").child("agent").to_string(), "sandbox.agent");
        assert_eq!(path.prefix(1).to_string(), "network");
    }
}
