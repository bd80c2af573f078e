//! Block classification
//!
//! Decides which block parser handles the line under the cursor.

use crate::grammar::Grammar;

/// Block kinds, in classification precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Fenced(Fence),
    Heading,
    Blockquote,
    Rule,
    Table,
    List,
    Paragraph,
}

/// Fenced block macros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence {
    Code,
    Noformat,
    Quote,
    Panel,
}

impl Fence {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "code" => Some(Self::Code),
            "noformat" => Some(Self::Noformat),
            "quote" => Some(Self::Quote),
            "panel" => Some(Self::Panel),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Noformat => "noformat",
            Self::Quote => "quote",
            Self::Panel => "panel",
        }
    }

    /// Closing marker, e.g. `{code}`
    pub fn closer(&self) -> &'static str {
        match self {
            Self::Code => "{code}",
            Self::Noformat => "{noformat}",
            Self::Quote => "{quote}",
            Self::Panel => "{panel}",
        }
    }
}

impl Grammar {
    /// Classify a line; blank lines never start a block and yield `None`.
    pub fn classify(&self, line: &str) -> Option<BlockKind> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(fence) = self
            .fence_open
            .captures(line)
            .and_then(|caps| Fence::parse(&caps[1]))
        {
            return Some(BlockKind::Fenced(fence));
        }

        let kind = if self.heading.is_match(line) {
            BlockKind::Heading
        } else if self.blockquote.is_match(line) {
            BlockKind::Blockquote
        } else if self.rule.is_match(line) {
            BlockKind::Rule
        } else if line.starts_with('|') {
            BlockKind::Table
        } else if self.list_item.is_match(line) {
            BlockKind::List
        } else {
            BlockKind::Paragraph
        };
        Some(kind)
    }
}
