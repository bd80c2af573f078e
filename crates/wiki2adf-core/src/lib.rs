//! wiki2adf-core: Core library for converting Jira wiki markup to ADF
//!
//! This crate provides:
//! - Compiled block and inline recognizers ([`Grammar`])
//! - Block classification and block parsers
//! - Inline content parsing with mark composition
//! - Error-tolerant conversion with collected [`Diagnostics`]
//!
//! ```
//! let conversion = wiki2adf_core::convert("h1. Title\n\nSome *bold* text");
//! assert!(conversion.diagnostics.is_empty());
//! assert_eq!(conversion.document.content.len(), 2);
//! ```

mod block;
pub mod classify;
pub mod convert;
pub mod diagnostics;
pub mod grammar;
mod inline;

pub use adf_model::{Block, Document, Inline, Mark};
pub use classify::{BlockKind, Fence};
pub use convert::{Conversion, Converter, convert};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Summary};
pub use grammar::Grammar;

/// Parse a run of inline markup with the standard grammar
///
/// Diagnostics are recorded into `diagnostics` against `line`.
pub fn parse_inline(text: &str, line: usize, diagnostics: &mut Diagnostics) -> Vec<Inline> {
    inline::InlineParser::new(Grammar::standard(), diagnostics, line).parse(text)
}
