//! ADF (Atlassian Document Format) node types
//!
//! The subset of ADF nodes and marks needed to express Jira wiki markup.
//! Reference: https://developer.atlassian.com/cloud/jira/platform/apis/document/structure/

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::is_valid_color;

/// ADF document format version
pub const ADF_VERSION: u32 = 1;

/// Errors raised by validated constructors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Heading level must be between 1 and 6, found {0}")]
    HeadingLevel(u32),

    #[error("Invalid color value: {0}")]
    InvalidColor(String),
}

/// Root node of an ADF document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: DocKind,
    pub content: Vec<Block>,
}

/// The fixed `type` of the document root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    #[default]
    Doc,
}

/// A block-level node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Heading(Heading),
    Rule,
    Table(Table),
    BulletList(List),
    OrderedList(List),
    CodeBlock(CodeBlock),
    Blockquote(Blockquote),
    Panel(Panel),
    Paragraph(Paragraph),
}

/// Heading node (h1. to h6.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub attrs: HeadingAttrs,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u32,
}

/// Table node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub content: Vec<TableRow>,
}

/// Table row node; rows of one table may hold different cell counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "tableRow")]
pub struct TableRow {
    pub content: Vec<TableCell>,
}

/// Table cell, either a header or a data cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TableCell {
    #[serde(rename = "tableHeader")]
    Header(Container),
    #[serde(rename = "tableCell")]
    Data(Container),
}

/// Block content of a table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub content: Vec<Block>,
}

/// Bullet or ordered list; the variant of [`Block`] carries the list type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub content: Vec<ListItem>,
}

/// List item: a paragraph, optionally followed by nested lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "listItem")]
pub struct ListItem {
    pub content: Vec<Block>,
}

/// Code block node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<CodeBlockAttrs>,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockAttrs {
    pub language: String,
}

/// Blockquote node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockquote {
    pub content: Vec<Block>,
}

/// Panel node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub attrs: PanelAttrs,
    pub content: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelAttrs {
    #[serde(rename = "panelType")]
    pub panel_type: PanelType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    #[default]
    Info,
}

/// Paragraph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub content: Vec<Inline>,
}

/// An inline node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text(Text),
    Mention(Mention),
    #[serde(rename = "mediaSingle")]
    Image(MediaSingle),
    HardBreak,
}

/// Text node with its set of marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

/// Mention node; the id is left unresolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub attrs: MentionAttrs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionAttrs {
    pub id: String,
    pub text: String,
}

/// Single media wrapper used for images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSingle {
    pub content: Vec<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "media")]
pub struct Media {
    pub attrs: MediaAttrs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttrs {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    External,
}

/// A mark attached to a text node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Strong,
    Em,
    Underline,
    Strike,
    Subsup { attrs: SubSupAttrs },
    Code,
    TextColor { attrs: ColorAttrs },
    Link { attrs: LinkAttrs },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSupAttrs {
    #[serde(rename = "type")]
    pub kind: SubSup,
}

/// Direction of a `subsup` mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubSup {
    Sub,
    Sup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAttrs {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttrs {
    pub href: String,
}

impl Document {
    /// Create a document; empty content becomes one empty paragraph
    pub fn new(mut content: Vec<Block>) -> Self {
        if content.is_empty() {
            content.push(Block::empty_paragraph());
        }
        Self {
            version: ADF_VERSION,
            kind: DocKind::Doc,
            content,
        }
    }
}

// Convenience constructors
impl Block {
    /// Heading with a level in 1..=6; other levels are rejected
    pub fn heading(level: u32, content: Vec<Inline>) -> Result<Self, ModelError> {
        if !(1..=6).contains(&level) {
            return Err(ModelError::HeadingLevel(level));
        }
        Ok(Block::Heading(Heading {
            attrs: HeadingAttrs { level },
            content,
        }))
    }

    pub fn rule() -> Self {
        Block::Rule
    }

    pub fn table(rows: Vec<TableRow>) -> Self {
        Block::Table(Table { content: rows })
    }

    pub fn bullet_list(items: Vec<ListItem>) -> Self {
        Block::BulletList(List { content: items })
    }

    pub fn ordered_list(items: Vec<ListItem>) -> Self {
        Block::OrderedList(List { content: items })
    }

    /// Code block holding `body` verbatim as a single unmarked text leaf
    pub fn code_block(language: Option<String>, body: impl Into<String>) -> Self {
        Block::CodeBlock(CodeBlock {
            attrs: language.map(|language| CodeBlockAttrs { language }),
            content: vec![Inline::text(body)],
        })
    }

    pub fn blockquote(content: Vec<Inline>) -> Self {
        Block::Blockquote(Blockquote {
            content: vec![Block::paragraph(content)],
        })
    }

    /// Info panel; a title becomes a leading plain-text paragraph
    pub fn panel(title: Option<&str>, mut paragraphs: Vec<Block>) -> Self {
        if let Some(title) = title {
            paragraphs.insert(0, Block::paragraph(vec![Inline::text(title)]));
        }
        if paragraphs.is_empty() {
            paragraphs.push(Block::empty_paragraph());
        }
        Block::Panel(Panel {
            attrs: PanelAttrs {
                panel_type: PanelType::Info,
            },
            content: paragraphs,
        })
    }

    /// Paragraph; an empty inline list becomes a single empty text node
    pub fn paragraph(mut content: Vec<Inline>) -> Self {
        if content.is_empty() {
            content.push(Inline::text(""));
        }
        Block::Paragraph(Paragraph { content })
    }

    pub fn empty_paragraph() -> Self {
        Block::paragraph(Vec::new())
    }

    /// ADF `type` name of this block
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Heading(_) => "heading",
            Block::Rule => "rule",
            Block::Table(_) => "table",
            Block::BulletList(_) => "bulletList",
            Block::OrderedList(_) => "orderedList",
            Block::CodeBlock(_) => "codeBlock",
            Block::Blockquote(_) => "blockquote",
            Block::Panel(_) => "panel",
            Block::Paragraph(_) => "paragraph",
        }
    }
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { content: cells }
    }
}

impl TableCell {
    pub fn header(content: Vec<Inline>) -> Self {
        TableCell::Header(Container {
            content: vec![Block::paragraph(content)],
        })
    }

    pub fn data(content: Vec<Inline>) -> Self {
        TableCell::Data(Container {
            content: vec![Block::paragraph(content)],
        })
    }

    pub fn is_header(&self) -> bool {
        matches!(self, TableCell::Header(_))
    }
}

impl ListItem {
    /// List item with its paragraph followed by nested lists
    pub fn new(content: Vec<Inline>, nested: Vec<Block>) -> Self {
        let mut blocks = Vec::with_capacity(nested.len() + 1);
        blocks.push(Block::paragraph(content));
        blocks.extend(nested);
        Self { content: blocks }
    }
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(Text {
            text: s.into(),
            marks: Vec::new(),
        })
    }

    pub fn marked(s: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut text = Text {
            text: s.into(),
            marks: Vec::with_capacity(marks.len()),
        };
        for mark in marks {
            text.push_mark(mark);
        }
        Inline::Text(text)
    }

    /// Mention of `identifier`, displayed as `@identifier`
    pub fn mention(identifier: &str) -> Self {
        Inline::Mention(Mention {
            attrs: MentionAttrs {
                id: String::new(),
                text: format!("@{identifier}"),
            },
        })
    }

    /// External image; the URL doubles as alt text
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        Inline::Image(MediaSingle {
            content: vec![Media {
                attrs: MediaAttrs {
                    kind: MediaKind::External,
                    alt: url.clone(),
                    url,
                },
            }],
        })
    }

    pub fn hard_break() -> Self {
        Inline::HardBreak
    }

    /// Add an enclosing mark. Marks go in front of the ones already present;
    /// non-text nodes are returned unchanged.
    pub fn with_outer_mark(self, mark: Mark) -> Self {
        match self {
            Inline::Text(mut text) => {
                if !text.marks.contains(&mark) {
                    text.marks.insert(0, mark);
                }
                Inline::Text(text)
            }
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Inline::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Text {
    /// Append a mark unless it is already present
    pub fn push_mark(&mut self, mark: Mark) {
        if !self.marks.contains(&mark) {
            self.marks.push(mark);
        }
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }
}

impl Mark {
    /// `textColor` mark; the value is kept as written once validated
    pub fn text_color(value: &str) -> Result<Self, ModelError> {
        if !is_valid_color(value) {
            return Err(ModelError::InvalidColor(value.to_string()));
        }
        Ok(Mark::TextColor {
            attrs: ColorAttrs {
                color: value.to_string(),
            },
        })
    }

    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            attrs: LinkAttrs { href: href.into() },
        }
    }

    pub fn superscript() -> Self {
        Mark::Subsup {
            attrs: SubSupAttrs { kind: SubSup::Sup },
        }
    }

    pub fn subscript() -> Self {
        Mark::Subsup {
            attrs: SubSupAttrs { kind: SubSup::Sub },
        }
    }
}
