use serde::{Deserialize, Serialize};

/// A retrieved document. The first line of `contents` is the title by
/// corpus convention; the rest is the body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub contents: String,
}

impl Document {
    pub fn new(id: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contents: contents.into(),
        }
    }

    /// Title line (first line of the contents).
    pub fn title(&self) -> &str {
        self.contents.lines().next().unwrap_or("")
    }

    /// Body text (everything after the title line).
    pub fn body(&self) -> &str {
        match self.contents.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        }
    }
}
