//! adf-model: Atlassian Document Format node types for wiki2adf
//!
//! This crate provides:
//! - ADF block, inline and mark types (the subset wiki2adf emits)
//! - Validated constructors for values the schema constrains
//! - serde serialization matching the ADF JSON shape
//!
//! ## Example
//!
//! ```rust
//! use adf_model::{Block, Document, Inline, Mark};
//!
//! let doc = Document::new(vec![
//!     Block::heading(1, vec![Inline::text("Hello")]).unwrap(),
//!     Block::paragraph(vec![Inline::marked("World", vec![Mark::Strong])]),
//! ]);
//!
//! let json = serde_json::to_string(&doc).unwrap();
//! assert!(json.starts_with(r#"{"version":1,"type":"doc""#));
//! ```

pub mod color;
pub mod node;

pub use color::{NAMED_COLORS, is_valid_color};
pub use node::{
    ADF_VERSION, Block, Blockquote, CodeBlock, CodeBlockAttrs, ColorAttrs, Container, DocKind,
    Document, Heading, HeadingAttrs, Inline, LinkAttrs, List, ListItem, Mark, Media, MediaAttrs,
    MediaKind, MediaSingle, Mention, MentionAttrs, ModelError, Panel, PanelAttrs, PanelType,
    Paragraph, SubSup, SubSupAttrs, Table, TableCell, TableRow, Text,
};
