//! Block parsers
//!
//! Each parser starts at the line the classifier looked at, consumes one or
//! more lines and returns exactly one block.

use adf_model::{Block, Inline, ListItem, TableCell, TableRow};
use tracing::trace;

use crate::classify::{BlockKind, Fence};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::grammar::Grammar;
use crate::inline::{InlineParser, merge_text};

/// A parsed block and the number of lines it used
#[derive(Debug)]
pub(crate) struct Parsed {
    pub(crate) block: Block,
    /// Paragraph for text following a fence closer on its line
    pub(crate) trailing: Option<Block>,
    pub(crate) consumed: usize,
}

impl Parsed {
    fn new(block: Block, consumed: usize) -> Self {
        Self {
            block,
            trailing: None,
            consumed,
        }
    }
}

/// List family of an item, given by its last marker character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFamily {
    Bullet,
    Ordered,
}

impl ListFamily {
    fn of_marker(marker: &str) -> Self {
        if marker.ends_with('#') {
            Self::Ordered
        } else {
            Self::Bullet
        }
    }

    fn block(self, items: Vec<ListItem>) -> Block {
        match self {
            Self::Bullet => Block::bullet_list(items),
            Self::Ordered => Block::ordered_list(items),
        }
    }
}

#[derive(Debug)]
struct ListEntry<'t> {
    depth: usize,
    family: ListFamily,
    text: &'t str,
}

pub(crate) struct BlockParser<'a> {
    grammar: &'a Grammar,
    lines: &'a [&'a str],
    diagnostics: &'a mut Diagnostics,
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new(
        grammar: &'a Grammar,
        lines: &'a [&'a str],
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            grammar,
            lines,
            diagnostics,
        }
    }

    /// Parse the block of `kind` starting at line index `start`
    pub(crate) fn parse(&mut self, kind: BlockKind, start: usize) -> Parsed {
        let parsed = match kind {
            BlockKind::Fenced(fence) => self.fenced(fence, start),
            BlockKind::Heading => self.heading(start),
            BlockKind::Blockquote => self.blockquote(start),
            BlockKind::Rule => Parsed::new(Block::rule(), 1),
            BlockKind::Table => self.table(start),
            BlockKind::List => self.list(start),
            BlockKind::Paragraph => self.paragraph(start),
        };
        trace!(
            line = start + 1,
            block = parsed.block.type_name(),
            consumed = parsed.consumed,
            "parsed block"
        );
        parsed
    }

    fn inline(&mut self, text: &str, line: usize) -> Vec<Inline> {
        InlineParser::new(self.grammar, self.diagnostics, line).parse(text)
    }

    fn record(
        &mut self,
        kind: DiagnosticKind,
        line: usize,
        original: &str,
        fallback: &str,
        message: impl Into<String>,
    ) {
        self.diagnostics
            .record(Diagnostic::new(kind, line, original, fallback, message));
    }

    fn line(&self, index: usize) -> &'a str {
        self.lines.get(index).copied().unwrap_or_default()
    }

    fn heading(&mut self, start: usize) -> Parsed {
        let line_no = start + 1;
        let line = self.line(start).trim();
        let Some(caps) = self.grammar.heading.captures(line) else {
            return self.paragraph(start);
        };

        let digits = caps.get(1).map_or("", |m| m.as_str());
        let title = caps.get(2);
        let content = self.inline(title.map_or("", |m| m.as_str()), line_no);
        let level = digits.parse::<u32>().unwrap_or(0);

        match Block::heading(level, content.clone()) {
            Ok(block) => Parsed::new(block, 1),
            Err(err) => {
                self.record(
                    DiagnosticKind::InvalidHeading,
                    line_no,
                    line,
                    line,
                    format!("{err}; kept as paragraph"),
                );
                let prefix = title.map_or(line, |m| &line[..m.start()]);
                let mut nodes = vec![Inline::text(prefix)];
                nodes.extend(content);
                Parsed::new(Block::paragraph(merge_text(nodes)), 1)
            }
        }
    }

    fn blockquote(&mut self, start: usize) -> Parsed {
        let line = self.line(start).trim();
        let text = self
            .grammar
            .blockquote
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());
        let content = self.inline(text, start + 1);
        Parsed::new(Block::blockquote(content), 1)
    }

    fn table(&mut self, start: usize) -> Parsed {
        let line_no = start + 1;
        let lines = self.lines;
        let region: Vec<&'a str> = lines[start..]
            .iter()
            .map(|line| line.trim())
            .take_while(|line| line.starts_with('|'))
            .collect();

        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        for row in &region {
            let (header, body) = match row.strip_prefix("||") {
                Some(rest) => (true, rest.strip_suffix("||").unwrap_or(rest)),
                None => {
                    let rest = row.strip_prefix('|').unwrap_or(row);
                    (false, rest.strip_suffix('|').unwrap_or(rest))
                }
            };
            if body.trim().is_empty() {
                skipped.push(*row);
                continue;
            }

            let separator = if header { "||" } else { "|" };
            let cells = split_cells(body, separator)
                .into_iter()
                .map(|cell| {
                    let content = self.inline(cell, line_no);
                    if header {
                        TableCell::header(content)
                    } else {
                        TableCell::data(content)
                    }
                })
                .collect();
            rows.push(TableRow::new(cells));
        }

        if rows.is_empty() {
            let raw = region.join(" ");
            self.record(
                DiagnosticKind::MalformedTable,
                line_no,
                &region.join("\n"),
                &raw,
                "Table has no cells; kept as paragraph",
            );
            let content = self.inline(&raw, line_no);
            return Parsed::new(Block::paragraph(content), region.len());
        }

        for row in skipped {
            self.record(
                DiagnosticKind::MalformedTable,
                line_no,
                row,
                "",
                "Table row has no cells; skipped",
            );
        }
        Parsed::new(Block::table(rows), region.len())
    }

    fn list(&mut self, start: usize) -> Parsed {
        let line_no = start + 1;
        let mut entries: Vec<ListEntry<'a>> = Vec::new();
        let mut consumed = 0;
        let mut previous_depth = 0;

        let lines = self.lines;
        for (offset, raw) in lines[start..].iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let Some(caps) = self.grammar.list_item.captures(line) else {
                break;
            };
            let (Some(marker), Some(text)) = (caps.get(1), caps.get(2)) else {
                break;
            };

            let family = ListFamily::of_marker(marker.as_str());
            let mut depth = marker.as_str().chars().count();
            if depth > previous_depth + 1 {
                let clamped = previous_depth + 1;
                self.record(
                    DiagnosticKind::InvalidList,
                    line_no,
                    line,
                    line,
                    format!("List item jumps from depth {previous_depth} to {depth}; placed at depth {clamped}"),
                );
                depth = clamped;
            }
            if depth == 1 && entries.first().is_some_and(|first| first.family != family) {
                break;
            }

            entries.push(ListEntry {
                depth,
                family,
                text: text.as_str(),
            });
            previous_depth = depth;
            consumed = offset + 1;
        }

        let Some(family) = entries.first().map(|entry| entry.family) else {
            return self.paragraph(start);
        };
        let block = self.build_list(family, &entries, line_no);
        Parsed::new(block, consumed)
    }

    /// Split entries into sibling lists wherever the family changes at the
    /// shallowest depth
    fn build_lists(&mut self, entries: &[ListEntry<'_>], line: usize) -> Vec<Block> {
        let mut lists = Vec::new();
        let mut rest = entries;
        while let Some(first) = rest.first() {
            let end = rest
                .iter()
                .position(|entry| entry.depth == first.depth && entry.family != first.family)
                .unwrap_or(rest.len());
            lists.push(self.build_list(first.family, &rest[..end], line));
            rest = &rest[end..];
        }
        lists
    }

    /// One list node; entries deeper than the first become nested lists of
    /// the item before them
    fn build_list(&mut self, family: ListFamily, entries: &[ListEntry<'_>], line: usize) -> Block {
        let mut items = Vec::new();
        let mut i = 0;
        while let Some(entry) = entries.get(i) {
            let children = entries[i + 1..]
                .iter()
                .take_while(|child| child.depth > entry.depth)
                .count();
            let content = self.inline(entry.text, line);
            let nested = self.build_lists(&entries[i + 1..i + 1 + children], line);
            items.push(ListItem::new(content, nested));
            i += children + 1;
        }
        family.block(items)
    }

    fn fenced(&mut self, fence: Fence, start: usize) -> Parsed {
        let line_no = start + 1;
        let lines = self.lines;
        let opener = self.line(start).trim();
        let (params, after_opener) = match self.grammar.fence_open.captures(opener) {
            Some(caps) => (
                caps.get(2).map_or("", |m| m.as_str()),
                caps.get(0).map_or(opener, |m| &opener[m.end()..]),
            ),
            None => ("", ""),
        };

        let closer = fence.closer();
        let mut body: Vec<&str> = Vec::new();
        let mut consumed = None;
        let mut rest = "";

        if let Some(idx) = after_opener.find(closer) {
            body.push(&after_opener[..idx]);
            rest = &after_opener[idx + closer.len()..];
            consumed = Some(1);
        } else {
            if !after_opener.is_empty() {
                body.push(after_opener);
            }
            for (offset, line) in lines[start + 1..].iter().enumerate() {
                if let Some(idx) = line.find(closer) {
                    let before = &line[..idx];
                    if !before.trim().is_empty() {
                        body.push(before);
                    }
                    rest = &line[idx + closer.len()..];
                    consumed = Some(offset + 2);
                    break;
                }
                body.push(line);
            }
        }

        let closer_line = consumed.map(|consumed| start + consumed);
        let consumed = match consumed {
            Some(consumed) => consumed,
            None => {
                self.record(
                    DiagnosticKind::UnclosedTag,
                    line_no,
                    opener,
                    opener,
                    format!("Unclosed {{{}}} block; closing at end of input", fence.name()),
                );
                lines.len() - start
            }
        };

        let block = match fence {
            Fence::Code => Block::code_block(code_language(params), body.join("\n")),
            Fence::Noformat => Block::code_block(None, body.join("\n")),
            Fence::Quote => {
                let text = join_trimmed(&body);
                Block::blockquote(self.inline(&text, line_no))
            }
            Fence::Panel => {
                let paragraphs = self
                    .panel_chunks(&body)
                    .iter()
                    .map(|chunk| Block::paragraph(self.inline(chunk, line_no)))
                    .collect();
                Block::panel(panel_title(params), paragraphs)
            }
        };

        let rest = rest.trim();
        let trailing = match closer_line {
            Some(closer_line) if !rest.is_empty() => {
                let original = self.line(closer_line - 1).trim();
                self.record(
                    DiagnosticKind::NestedFormatting,
                    closer_line,
                    original,
                    rest,
                    format!("Text after {closer} on the same line; moved to a new paragraph"),
                );
                Some(Block::paragraph(self.inline(rest, closer_line)))
            }
            _ => None,
        };

        Parsed {
            block,
            trailing,
            consumed,
        }
    }

    /// One chunk per non-blank panel line, except that a nested fence keeps
    /// every line up to its closer in a single chunk
    fn panel_chunks(&self, body: &[&str]) -> Vec<String> {
        let lines: Vec<&str> = body
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        let mut chunks = Vec::new();
        let mut i = 0;
        while let Some(line) = lines.get(i) {
            let end = self
                .open_inner_fence(line)
                .and_then(|closer| {
                    lines[i + 1..]
                        .iter()
                        .position(|next| next.contains(closer))
                })
                .map_or(i, |offset| i + 1 + offset);
            chunks.push(lines[i..=end].join("\n"));
            i = end + 1;
        }
        chunks
    }

    /// Closer of a fence opened on `line` and left open at its end
    fn open_inner_fence(&self, line: &str) -> Option<&'static str> {
        let Some(BlockKind::Fenced(fence)) = self.grammar.classify(line) else {
            return None;
        };
        let caps = self.grammar.fence_open.captures(line)?;
        let after = &line[caps.get(0)?.end()..];
        (!after.contains(fence.closer())).then_some(fence.closer())
    }

    fn paragraph(&mut self, start: usize) -> Parsed {
        let mut end = start + 1;
        while let Some(line) = self.lines.get(end) {
            if !matches!(self.grammar.classify(line), Some(BlockKind::Paragraph)) {
                break;
            }
            end += 1;
        }
        let text = join_trimmed(&self.lines[start..end]);
        let content = self.inline(&text, start + 1);
        Parsed::new(Block::paragraph(content), end - start)
    }
}

/// Trim every non-blank line and join with single spaces
fn join_trimmed(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a table row on `separator`, leaving separators inside `[...]`,
/// `{...}` and `!image|params!` alone
fn split_cells<'t>(body: &'t str, separator: &str) -> Vec<&'t str> {
    let mut cells = Vec::new();
    let mut square = 0usize;
    let mut curly = 0usize;
    let mut cell_start = 0;
    let mut i = 0;

    while let Some(c) = body[i..].chars().next() {
        if square == 0 && curly == 0 {
            if body[i..].starts_with(separator) {
                cells.push(body[cell_start..i].trim());
                i += separator.len();
                cell_start = i;
                continue;
            }
            if let Some(len) = image_span(&body[i..]) {
                i += len;
                continue;
            }
        }
        match c {
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '{' => curly += 1,
            '}' => curly = curly.saturating_sub(1),
            _ => {}
        }
        i += c.len_utf8();
    }
    cells.push(body[cell_start..].trim());
    cells
}

/// Byte length of an image token at the start of `text`: `!src!` or
/// `!src|params!` where `src` has no whitespace
fn image_span(text: &str) -> Option<usize> {
    let inner = text.strip_prefix('!')?;
    let end = inner.find('!')?;
    let token = &inner[..end];
    let source = token.split('|').next()?;
    if source.is_empty() || source.contains(char::is_whitespace) || token.contains('\n') {
        return None;
    }
    Some(end + 2)
}

/// `{code:java}` and `{code:java|title=x}` name a language; `{code:title=x}`
/// does not
fn code_language(params: &str) -> Option<String> {
    let first = params.split('|').next()?.trim();
    if first.is_empty() || first.contains('=') {
        None
    } else {
        Some(first.to_string())
    }
}

fn panel_title(params: &str) -> Option<&str> {
    params
        .split('|')
        .filter_map(|param| param.trim().strip_prefix("title="))
        .map(str::trim)
        .find(|title| !title.is_empty())
}
