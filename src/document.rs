//! Splitting a workflow Markdown file into frontmatter and body.
//!
//! The split is lossless: [`Document::render`] reproduces the input byte for
//! byte as long as the frontmatter text has not been replaced.

use crate::yaml::errors::FrontmatterError;

const DELIMITER: &str = "---";

/// The `---` delimited block at the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBlock {
    /// Blank lines that precede the opening delimiter
    pub leading: String,
    /// Opening delimiter line, including its line terminator
    pub opening: String,
    /// Text strictly between the delimiter lines
    pub text: String,
    /// Closing delimiter line, including its line terminator (if any)
    pub closing: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    frontmatter: Option<FrontmatterBlock>,
    body: String,
}

impl Document {
    /// Split `input` into frontmatter and body.
    ///
    /// A frontmatter block exists when the first non-blank line is `---`.
    /// Input without one is all body. An opening delimiter without a
    /// matching closing line is an error.
    pub fn parse(input: &str) -> Result<Self, FrontmatterError> {
        let mut offset = 0usize;
        let mut line_no = 0usize;
        let mut lines = input.split_inclusive('\n');

        let opening = loop {
            let Some(line) = lines.next() else {
                return Ok(Self::without_frontmatter(input));
            };
            line_no += 1;
            if line.trim().is_empty() {
                offset += line.len();
                continue;
            }
            if !is_delimiter(line) {
                return Ok(Self::without_frontmatter(input));
            }
            break line;
        };

        let leading = &input[..offset];
        let opening_line = line_no;
        let text_start = offset + opening.len();
        let mut cursor = text_start;

        for line in lines {
            if is_delimiter(line) {
                let closing_end = cursor + line.len();
                return Ok(Self {
                    frontmatter: Some(FrontmatterBlock {
                        leading: leading.to_string(),
                        opening: opening.to_string(),
                        text: input[text_start..cursor].to_string(),
                        closing: line.to_string(),
                    }),
                    body: input[closing_end..].to_string(),
                });
            }
            cursor += line.len();
        }

        Err(FrontmatterError::MalformedFrontmatter { line: opening_line })
    }

    fn without_frontmatter(input: &str) -> Self {
        Self {
            frontmatter: None,
            body: input.to_string(),
        }
    }

    pub fn frontmatter(&self) -> Option<&FrontmatterBlock> {
        self.frontmatter.as_ref()
    }

    pub fn has_frontmatter(&self) -> bool {
        self.frontmatter.is_some()
    }

    /// Frontmatter text, or the empty string when the document has none.
    pub fn frontmatter_text(&self) -> &str {
        self.frontmatter
            .as_ref()
            .map(|block| block.text.as_str())
            .unwrap_or("")
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the frontmatter text, keeping delimiters and body.
    ///
    /// A document without frontmatter gains a fresh `---` block when `text`
    /// is non-empty.
    pub fn with_frontmatter_text(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        let frontmatter = match &self.frontmatter {
            Some(block) => Some(FrontmatterBlock {
                text,
                ..block.clone()
            }),
            None if text.is_empty() => None,
            None => Some(FrontmatterBlock {
                leading: String::new(),
                opening: format!("{DELIMITER}\n"),
                text,
                closing: format!("{DELIMITER}\n"),
            }),
        };
        Self {
            frontmatter,
            body: self.body.clone(),
        }
    }

    /// Join the parts back into file contents.
    pub fn render(&self) -> String {
        match &self.frontmatter {
            Some(block) => {
                let mut out = String::with_capacity(
                    block.leading.len()
                        + block.opening.len()
                        + block.text.len()
                        + block.closing.len()
                        + self.body.len(),
                );
                out.push_str(&block.leading);
                out.push_str(&block.opening);
                out.push_str(&block.text);
                out.push_str(&block.closing);
                out.push_str(&self.body);
                out
            }
            None => self.body.clone(),
        }
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}
