//! Diagnostics collected while converting
//!
//! Every anomaly the converter recovers from is recorded here together with
//! the fallback it applied. Recording never fails and never stops conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Kinds of recoverable parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedTable,
    UnclosedTag,
    InvalidHeading,
    MalformedLink,
    InvalidColor,
    NestedFormatting,
    UnknownMacro,
    InvalidList,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedTable => "malformed_table",
            Self::UnclosedTag => "unclosed_tag",
            Self::InvalidHeading => "invalid_heading",
            Self::MalformedLink => "malformed_link",
            Self::InvalidColor => "invalid_color",
            Self::NestedFormatting => "nested_formatting",
            Self::UnknownMacro => "unknown_macro",
            Self::InvalidList => "invalid_list",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable parse anomaly and the fallback applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-indexed line of the block the anomaly was found in
    pub line: usize,
    /// Markup as it appeared in the input
    pub original_text: String,
    /// What was emitted in its place
    pub fallback_text: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        line: usize,
        original_text: impl Into<String>,
        fallback_text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line,
            original_text: original_text.into(),
            fallback_text: fallback_text.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: [{}] {}", self.line, self.kind, self.message)
    }
}

/// Append-only diagnostics store for one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        debug!(
            kind = %diagnostic.kind,
            line = diagnostic.line,
            original = %diagnostic.original_text,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn count_by_kind(&self) -> BTreeMap<DiagnosticKind, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.entries {
            *counts.entry(diagnostic.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Entries grouped by kind, in taxonomy order
    pub fn summary(&self) -> Summary {
        let mut errors_by_kind: BTreeMap<DiagnosticKind, Vec<Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.entries {
            errors_by_kind
                .entry(diagnostic.kind)
                .or_default()
                .push(diagnostic.clone());
        }
        Summary {
            total_errors: self.entries.len(),
            errors_by_kind,
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Diagnostics grouped by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_errors: usize,
    pub errors_by_kind: BTreeMap<DiagnosticKind, Vec<Diagnostic>>,
}
