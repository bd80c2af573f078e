//! Jira wiki markup to ADF conversion
//!
//! Drives a line cursor over the input: blank lines separate blocks, every
//! other line is classified and handed to its block parser.

use adf_model::Document;
use tracing::debug;

use crate::block::BlockParser;
use crate::diagnostics::{Diagnostic, Diagnostics, Summary};
use crate::grammar::Grammar;

/// Result of converting one document
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub document: Document,
    pub diagnostics: Diagnostics,
}

impl Conversion {
    /// Compact JSON of the document
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.document)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.document)
    }

    /// Diagnostics recorded during conversion, in the order they were found
    pub fn errors(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    pub fn summary(&self) -> Summary {
        self.diagnostics.summary()
    }
}

/// Convert markup with the standard grammar
pub fn convert(text: &str) -> Conversion {
    Converter::new(Grammar::standard()).convert(text)
}

/// Converter bound to a grammar
#[derive(Debug, Clone, Copy)]
pub struct Converter<'g> {
    grammar: &'g Grammar,
}

impl<'g> Converter<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn convert(&self, text: &str) -> Conversion {
        let text = normalize_line_endings(text);
        let lines: Vec<&str> = text.lines().collect();
        let mut diagnostics = Diagnostics::new();
        let mut blocks = Vec::new();

        {
            let mut parser = BlockParser::new(self.grammar, &lines, &mut diagnostics);
            let mut cursor = 0;
            while let Some(line) = lines.get(cursor) {
                let Some(kind) = self.grammar.classify(line) else {
                    cursor += 1;
                    continue;
                };
                debug!(line = cursor + 1, ?kind, "dispatch block");
                let parsed = parser.parse(kind, cursor);
                blocks.push(parsed.block);
                blocks.extend(parsed.trailing);
                cursor += parsed.consumed.max(1);
            }
        }

        debug!(
            blocks = blocks.len(),
            diagnostics = diagnostics.len(),
            "conversion finished"
        );
        Conversion {
            document: Document::new(blocks),
            diagnostics,
        }
    }
}

/// Turn `\r\n` and lone `\r` into `\n`
fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests;
