//! Inline content parser
//!
//! Scans a run of text left to right. At each position every recognizer is
//! asked for its next match; the earliest match wins and ties go to the
//! recognizer declared first in [`Grammar`]. Literal text between matches
//! becomes plain text nodes.

use adf_model::{Inline, Mark};
use regex::Captures;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::grammar::{Grammar, InlineKind, InlineRule};

/// Macro names that have a dedicated recognizer when properly closed
const SPAN_MACROS: &[&str] = &["color", "code", "noformat", "quote", "panel"];

/// Failure inside a recognizer's transform
#[derive(Debug, Error)]
enum TransformError {
    #[error("{0} match is missing its content")]
    MissingGroup(&'static str),

    #[error("{0} opens another {0} span before closing")]
    NestedSpan(&'static str),
}

/// Inline parser bound to one conversion's diagnostics
pub(crate) struct InlineParser<'a> {
    grammar: &'a Grammar,
    diagnostics: &'a mut Diagnostics,
    line: usize,
}

impl<'a> InlineParser<'a> {
    pub(crate) fn new(grammar: &'a Grammar, diagnostics: &'a mut Diagnostics, line: usize) -> Self {
        Self {
            grammar,
            diagnostics,
            line,
        }
    }

    /// Parse `text` into inline nodes; blank input yields no nodes
    pub(crate) fn parse(&mut self, text: &str) -> Vec<Inline> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut nodes = Vec::new();
        self.scan(text, &mut nodes);
        merge_text(nodes)
    }

    fn scan(&mut self, text: &str, out: &mut Vec<Inline>) {
        let mut pos = 0;

        while pos < text.len() {
            let Some((rule, caps)) = self.earliest_match(text, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            if whole.start() > pos {
                out.push(Inline::text(&text[pos..whole.start()]));
            }

            match self.transform(rule.kind, &caps) {
                Ok(nodes) => out.extend(nodes),
                Err(err) => {
                    self.record(
                        DiagnosticKind::NestedFormatting,
                        whole.as_str(),
                        whole.as_str(),
                        format!("Inline formatting error: {err}"),
                    );
                    out.push(Inline::text(whole.as_str()));
                }
            }

            pos = whole.end().max(pos + 1);
        }

        if pos < text.len() {
            out.push(Inline::text(&text[pos..]));
        }
    }

    fn earliest_match<'h>(&self, text: &'h str, pos: usize) -> Option<(&'a InlineRule, Captures<'h>)> {
        let grammar: &'a Grammar = self.grammar;
        let mut best: Option<(&'a InlineRule, Captures<'h>)> = None;

        for rule in &grammar.inline {
            let Some(caps) = rule.find_at(text, pos) else {
                continue;
            };
            let Some(start) = caps.get(0).map(|m| m.start()) else {
                continue;
            };
            let better = match &best {
                Some((_, current)) => current.get(0).is_some_and(|m| start < m.start()),
                None => true,
            };
            if better {
                best = Some((rule, caps));
            }
        }
        best
    }

    fn transform(
        &mut self,
        kind: InlineKind,
        caps: &Captures<'_>,
    ) -> Result<Vec<Inline>, TransformError> {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str())
                .ok_or(TransformError::MissingGroup(kind.name()))
        };

        let nodes = match kind {
            InlineKind::ColorSpan => {
                let value = group(1)?.trim();
                let interior = group(2)?;
                if interior.contains("{color:") {
                    return Err(TransformError::NestedSpan(kind.name()));
                }
                match Mark::text_color(value) {
                    Ok(mark) => self.styled(interior, mark),
                    Err(err) => {
                        self.record(DiagnosticKind::InvalidColor, whole, interior, err.to_string());
                        vec![Inline::text(interior)]
                    }
                }
            }
            InlineKind::LabeledLink => {
                let label = group(1)?.trim();
                let target = group(2)?.trim();
                self.link(whole, label, target)
            }
            InlineKind::BareLink => {
                let target = group(1)?.trim();
                self.link(whole, target, target)
            }
            InlineKind::Image => vec![Inline::image(group(1)?)],
            InlineKind::FencedArtifact => vec![Inline::text(whole)],
            InlineKind::InlineCode => vec![Inline::marked(group(1)?, vec![Mark::Code])],
            InlineKind::Strong => self.styled(group(1)?, Mark::Strong),
            InlineKind::Emphasis | InlineKind::Citation => self.styled(group(1)?, Mark::Em),
            InlineKind::Underline => self.styled(group(1)?, Mark::Underline),
            InlineKind::Strike => self.styled(group(1)?, Mark::Strike),
            InlineKind::Superscript => self.styled(group(1)?, Mark::superscript()),
            InlineKind::Subscript => self.styled(group(1)?, Mark::subscript()),
            InlineKind::LineBreak => vec![Inline::hard_break()],
            InlineKind::Mention => vec![Inline::mention(group(1)?.trim())],
            InlineKind::Macro => {
                let name = group(1)?;
                if SPAN_MACROS.contains(&name) {
                    self.record(
                        DiagnosticKind::UnclosedTag,
                        whole,
                        whole,
                        format!("Unclosed {{{name}}} tag; kept as text"),
                    );
                } else {
                    self.record(
                        DiagnosticKind::UnknownMacro,
                        whole,
                        whole,
                        format!("Unknown macro {{{name}}}; kept as text"),
                    );
                }
                vec![Inline::text(whole)]
            }
        };
        Ok(nodes)
    }

    /// Re-scan a span's interior and add `mark` to every text node in it
    fn styled(&mut self, interior: &str, mark: Mark) -> Vec<Inline> {
        let mut nodes = Vec::new();
        self.scan(interior, &mut nodes);
        nodes
            .into_iter()
            .map(|node| node.with_outer_mark(mark.clone()))
            .collect()
    }

    fn link(&mut self, whole: &str, label: &str, target: &str) -> Vec<Inline> {
        if target.is_empty() || target.contains(char::is_whitespace) {
            self.record(
                DiagnosticKind::MalformedLink,
                whole,
                whole,
                format!("Invalid link target {target:?}; kept as text"),
            );
            return vec![Inline::text(whole)];
        }
        let label = if label.is_empty() { target } else { label };
        vec![Inline::marked(label, vec![Mark::link(target)])]
    }

    fn record(
        &mut self,
        kind: DiagnosticKind,
        original: &str,
        fallback: &str,
        message: impl Into<String>,
    ) {
        self.diagnostics
            .record(Diagnostic::new(kind, self.line, original, fallback, message));
    }
}

/// Drop empty text nodes and join neighbouring text nodes with equal marks
pub(crate) fn merge_text(nodes: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Inline::Text(text) = &node {
            if text.text.is_empty() {
                continue;
            }
            if let Some(Inline::Text(prev)) = merged.last_mut() {
                if prev.marks == text.marks {
                    prev.text.push_str(&text.text);
                    continue;
                }
            }
        }
        merged.push(node);
    }
    merged
}
