//! Compiled recognizers for Jira wiki markup
//!
//! A [`Grammar`] is read-only configuration: it is built once, shared by
//! reference across conversions and never holds per-conversion state.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static STANDARD: LazyLock<Grammar> = LazyLock::new(Grammar::new);

/// Block and inline patterns of the markup dialect
#[derive(Debug)]
pub struct Grammar {
    pub(crate) fence_open: Regex,
    pub(crate) heading: Regex,
    pub(crate) blockquote: Regex,
    pub(crate) rule: Regex,
    pub(crate) list_item: Regex,
    pub(crate) inline: Vec<InlineRule>,
}

/// Inline recognizers; declaration order is tie-break precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InlineKind {
    ColorSpan,
    LabeledLink,
    BareLink,
    Image,
    FencedArtifact,
    InlineCode,
    Strong,
    Emphasis,
    Underline,
    Strike,
    Superscript,
    Subscript,
    Citation,
    LineBreak,
    Mention,
    Macro,
}

impl InlineKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::ColorSpan => "color span",
            Self::LabeledLink | Self::BareLink => "link",
            Self::Image => "image",
            Self::FencedArtifact => "inline block",
            Self::InlineCode => "inline code",
            Self::Strong => "bold",
            Self::Emphasis => "italic",
            Self::Underline => "underline",
            Self::Strike => "strikethrough",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::Citation => "citation",
            Self::LineBreak => "line break",
            Self::Mention => "mention",
            Self::Macro => "macro",
        }
    }
}

/// One inline recognizer
#[derive(Debug)]
pub(crate) struct InlineRule {
    pub(crate) kind: InlineKind,
    regex: Regex,
    /// Symmetric style markers only match at word boundaries around a
    /// non-blank interior
    bounded: bool,
}

impl InlineRule {
    fn new(kind: InlineKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: compile(pattern),
            bounded: false,
        }
    }

    fn bounded(kind: InlineKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: compile(pattern),
            bounded: true,
        }
    }

    /// First acceptable match in `haystack` starting at or after `start`
    pub(crate) fn find_at<'h>(&self, haystack: &'h str, start: usize) -> Option<Captures<'h>> {
        if !self.bounded {
            return self.regex.captures_at(haystack, start);
        }

        let mut from = start;
        while from <= haystack.len() {
            let caps = self.regex.captures_at(haystack, from)?;
            let whole = caps.get(0)?;
            if is_bounded(haystack, &caps) {
                return Some(caps);
            }
            // Retry one character past the rejected opening marker
            from = whole.start()
                + haystack[whole.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        None
    }
}

fn is_bounded(haystack: &str, caps: &Captures<'_>) -> bool {
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        return false;
    };
    let before = haystack[..whole.start()].chars().next_back();
    let after = haystack[whole.end()..].chars().next();
    let inner = inner.as_str();

    !before.is_some_and(char::is_alphanumeric)
        && !after.is_some_and(char::is_alphanumeric)
        && !inner.starts_with(char::is_whitespace)
        && !inner.ends_with(char::is_whitespace)
}

fn compile(pattern: &str) -> Regex {
    // Patterns are fixed literals covered by tests; a failure here is a
    // programming error, not an input error.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

impl Grammar {
    /// Shared instance used by [`crate::convert`]
    pub fn standard() -> &'static Grammar {
        &STANDARD
    }

    pub fn new() -> Self {
        use InlineKind::*;

        let inline = vec![
            InlineRule::new(ColorSpan, r"(?s)\{color:([^}]*)\}(.*?)\{color\}"),
            InlineRule::new(LabeledLink, r"\[([^~|\]][^|\]]*)\|([^\]]*)\]"),
            InlineRule::new(BareLink, r"\[([^~|\]][^\]]*)\]"),
            InlineRule::new(Image, r"!([^!\s|]+)(?:\|[^!\n]*)?!"),
            InlineRule::new(
                FencedArtifact,
                r"(?s)\{code(?::[^}]*)?\}.*?\{code\}|\{noformat(?::[^}]*)?\}.*?\{noformat\}|\{quote\}.*?\{quote\}",
            ),
            InlineRule::new(InlineCode, r"\{\{([^}]+)\}\}"),
            InlineRule::bounded(Strong, r"\*([^*\n]+)\*"),
            InlineRule::bounded(Emphasis, r"_([^_\n]+)_"),
            InlineRule::bounded(Underline, r"\+([^+\n]+)\+"),
            InlineRule::bounded(Strike, r"-([^-\n]+)-"),
            InlineRule::bounded(Superscript, r"\^([^\^\n]+)\^"),
            InlineRule::bounded(Subscript, r"~([^~\n]+)~"),
            InlineRule::bounded(Citation, r"\?\?([^?\n]+)\?\?"),
            InlineRule::new(LineBreak, r"\\\\"),
            InlineRule::new(Mention, r"\[~([^\]|]+)\]"),
            InlineRule::new(Macro, r"\{([A-Za-z][A-Za-z0-9]*)(?::[^}]*)?\}"),
        ];

        Self {
            fence_open: compile(r"^\{(code|noformat|quote|panel)(?::([^}]*))?\}"),
            heading: compile(r"^h(\d{1,2})\.(?:\s+(.*))?$"),
            blockquote: compile(r"^bq\.(?:\s+(.*))?$"),
            rule: compile(r"^-{4,}$"),
            list_item: compile(r"^([*#]+|-)\s+(.*)$"),
            inline,
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}
