use super::*;
use crate::diagnostics::DiagnosticKind;
use adf_model::{Block, Inline, Mark};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn content(input: &str) -> Value {
    let document = serde_json::to_value(&convert(input).document).unwrap();
    document["content"].clone()
}

fn kinds(conversion: &Conversion) -> Vec<DiagnosticKind> {
    conversion.diagnostics.iter().map(|d| d.kind).collect()
}

fn para(text: &str) -> Value {
    json!({"type": "paragraph", "content": [{"type": "text", "text": text}]})
}

fn item(text: &str) -> Value {
    json!({"type": "listItem", "content": [para(text)]})
}

#[test]
fn test_simple_document_json() {
    let conversion = convert("h1. Title\n----");
    insta::assert_snapshot!(conversion.to_json().unwrap(), @r#"{"version":1,"type":"doc","content":[{"type":"heading","attrs":{"level":1},"content":[{"type":"text","text":"Title"}]},{"type":"rule"}]}"#);
}

#[test]
fn test_empty_input_gets_placeholder_paragraph() {
    let empty = convert("");
    insta::assert_snapshot!(empty.to_json().unwrap(), @r#"{"version":1,"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":""}]}]}"#);
    for input in ["\n\n", "   \n\t\n"] {
        let conversion = convert(input);
        assert!(conversion.diagnostics.is_empty());
        assert_eq!(conversion, empty);
    }
}

#[test]
fn test_headings() {
    let blocks = content("h1. One\nh3. Three\nh6. Six");
    assert_eq!(blocks[0]["attrs"]["level"], 1);
    assert_eq!(blocks[1]["attrs"]["level"], 3);
    assert_eq!(blocks[2]["attrs"]["level"], 6);
    assert_eq!(blocks[2]["content"][0]["text"], "Six");
}

#[test]
fn test_heading_with_inline_markup() {
    assert_eq!(
        content("h2. The *main* part"),
        json!([{
            "type": "heading",
            "attrs": {"level": 2},
            "content": [
                {"type": "text", "text": "The "},
                {"type": "text", "text": "main", "marks": [{"type": "strong"}]},
                {"type": "text", "text": " part"}
            ]
        }])
    );
}

#[test]
fn test_invalid_heading_degrades_to_paragraph() {
    let conversion = convert("h7. Too deep");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::InvalidHeading]);
    assert_eq!(
        conversion.document.content,
        vec![Block::paragraph(vec![Inline::text("h7. Too deep")])]
    );
    let diagnostic = &conversion.errors()[0];
    assert_eq!(diagnostic.line, 1);
    assert_eq!(diagnostic.original_text, "h7. Too deep");
}

#[test]
fn test_code_block_is_byte_for_byte() {
    let input = "{code}\n*stars*\n  indented _x_ {color:red}y{color}\n{code}";
    let conversion = convert(input);
    assert!(conversion.diagnostics.is_empty());
    assert_eq!(
        conversion.document.content,
        vec![Block::code_block(
            None,
            "*stars*\n  indented _x_ {color:red}y{color}"
        )]
    );
}

#[test]
fn test_code_block_language() {
    assert_eq!(
        content("{code:java}\nint x = 1;\n{code}"),
        json!([{
            "type": "codeBlock",
            "attrs": {"language": "java"},
            "content": [{"type": "text", "text": "int x = 1;"}]
        }])
    );
    assert_eq!(
        content("{code:title=Main.java}\nint x;\n{code}"),
        json!([{"type": "codeBlock", "content": [{"type": "text", "text": "int x;"}]}])
    );
}

#[test]
fn test_text_after_closer_becomes_paragraph() {
    let conversion = convert("{code}let x = 1;{code} trailing *words*\nnext");
    assert_eq!(
        conversion.document.content,
        vec![
            Block::code_block(None, "let x = 1;"),
            Block::paragraph(vec![
                Inline::text("trailing "),
                Inline::marked("words", vec![Mark::Strong]),
            ]),
            Block::paragraph(vec![Inline::text("next")]),
        ]
    );
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::NestedFormatting]);
    let diagnostic = &conversion.errors()[0];
    assert_eq!(diagnostic.line, 1);
    assert_eq!(diagnostic.fallback_text, "trailing *words*");
}

#[test]
fn test_text_after_multiline_closer() {
    let conversion = convert("{noformat}\nbody\n{noformat} after");
    assert_eq!(
        conversion.document.content,
        vec![
            Block::code_block(None, "body"),
            Block::paragraph(vec![Inline::text("after")]),
        ]
    );
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::NestedFormatting]);
    assert_eq!(conversion.errors()[0].line, 3);
    assert_eq!(conversion.errors()[0].original_text, "{noformat} after");

    assert!(convert("{code}\nbody\n{code}   ").diagnostics.is_empty());
}

#[test]
fn test_closer_inside_last_body_line() {
    let conversion = convert("{noformat}\n  keep   spacing\nlast line{noformat}");
    assert_eq!(
        conversion.document.content,
        vec![Block::code_block(None, "  keep   spacing\nlast line")]
    );
}

#[test]
fn test_unclosed_code_block() {
    let conversion = convert("intro\n\n{code}\nlet x = 1;\n*not bold*");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::UnclosedTag]);
    assert_eq!(conversion.errors()[0].line, 3);
    assert_eq!(
        conversion.document.content,
        vec![
            Block::paragraph(vec![Inline::text("intro")]),
            Block::code_block(None, "let x = 1;\n*not bold*"),
        ]
    );
}

#[test]
fn test_color_values() {
    for value in ["#fff", "red", "#0066cc", "0066CC", "Grey"] {
        let conversion = convert(&format!("{{color:{value}}}x{{color}}"));
        assert!(conversion.diagnostics.is_empty(), "{value}");
        assert_eq!(
            conversion.document.content,
            vec![Block::paragraph(vec![Inline::marked(
                "x",
                vec![Mark::text_color(value).unwrap()]
            )])]
        );
    }
}

#[test]
fn test_invalid_color() {
    let conversion = convert("{color:notacolor}x{color}");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::InvalidColor]);
    assert_eq!(content("{color:notacolor}x{color}"), json!([para("x")]));
}

#[test]
fn test_color_precedence_over_bold() {
    let conversion = convert("{color:red}*bold*{color}");
    insta::assert_snapshot!(conversion.to_json().unwrap(), @r#"{"version":1,"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"bold","marks":[{"type":"textColor","attrs":{"color":"red"}},{"type":"strong"}]}]}]}"#);
}

#[test]
fn test_color_span_across_lines() {
    assert_eq!(
        content("{color:green}first\nsecond{color}"),
        json!([{
            "type": "paragraph",
            "content": [{
                "type": "text",
                "text": "first second",
                "marks": [{"type": "textColor", "attrs": {"color": "green"}}]
            }]
        }])
    );
}

#[test]
fn test_list_homogeneity() {
    assert_eq!(
        content("* a\n# b\n* c"),
        json!([
            {"type": "bulletList", "content": [item("a")]},
            {"type": "orderedList", "content": [item("b")]},
            {"type": "bulletList", "content": [item("c")]}
        ])
    );
}

#[test]
fn test_dash_bullets() {
    assert_eq!(
        content("- one\n- two"),
        json!([{"type": "bulletList", "content": [item("one"), item("two")]}])
    );
}

#[test]
fn test_nested_list() {
    let conversion = convert("* a\n** b\n** c\n* d");
    assert!(conversion.diagnostics.is_empty());
    assert_eq!(
        content("* a\n** b\n** c\n* d"),
        json!([{
            "type": "bulletList",
            "content": [
                {
                    "type": "listItem",
                    "content": [
                        para("a"),
                        {"type": "bulletList", "content": [item("b"), item("c")]}
                    ]
                },
                item("d")
            ]
        }])
    );
}

#[test]
fn test_nested_family_follows_last_marker() {
    assert_eq!(
        content("# one\n#* sub\n#* sub two\n## numbered\n# two"),
        json!([{
            "type": "orderedList",
            "content": [
                {
                    "type": "listItem",
                    "content": [
                        para("one"),
                        {"type": "bulletList", "content": [item("sub"), item("sub two")]},
                        {"type": "orderedList", "content": [item("numbered")]}
                    ]
                },
                item("two")
            ]
        }])
    );
}

#[test]
fn test_list_depth_jump_is_clamped() {
    let conversion = convert("* a\n*** c");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::InvalidList]);
    assert_eq!(
        content("* a\n*** c"),
        json!([{
            "type": "bulletList",
            "content": [{
                "type": "listItem",
                "content": [para("a"), {"type": "bulletList", "content": [item("c")]}]
            }]
        }])
    );
}

#[test]
fn test_list_starting_deep_is_clamped() {
    let conversion = convert("## deep");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::InvalidList]);
    assert_eq!(
        content("## deep"),
        json!([{"type": "orderedList", "content": [item("deep")]}])
    );
}

#[test]
fn test_blank_line_inside_list() {
    assert_eq!(
        content("* a\n\n* b\nafter"),
        json!([
            {"type": "bulletList", "content": [item("a"), item("b")]},
            para("after")
        ])
    );
}

#[test]
fn test_table_header_and_data_rows() {
    let conversion = convert("||H1||H2||\n|a|b|");
    assert!(conversion.diagnostics.is_empty());
    let Block::Table(table) = &conversion.document.content[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.content.len(), 2);
    assert!(table.content[0].content.iter().all(|cell| cell.is_header()));
    assert_eq!(table.content[1].content.len(), 2);
    assert!(table.content[1].content.iter().all(|cell| !cell.is_header()));

    assert_eq!(
        content("||H1||H2||\n|a|b|"),
        json!([{
            "type": "table",
            "content": [
                {"type": "tableRow", "content": [
                    {"type": "tableHeader", "content": [para("H1")]},
                    {"type": "tableHeader", "content": [para("H2")]}
                ]},
                {"type": "tableRow", "content": [
                    {"type": "tableCell", "content": [para("a")]},
                    {"type": "tableCell", "content": [para("b")]}
                ]}
            ]
        }])
    );
}

#[test]
fn test_table_cells_with_markup() {
    let blocks = content("||*Bold Header*||_Italic Header_||\n|[Go|http://x.io]|{{a|b}}|");
    let header = &blocks[0]["content"][0]["content"];
    assert_eq!(header[0]["content"][0]["content"][0]["marks"], json!([{"type": "strong"}]));
    let data = &blocks[0]["content"][1]["content"];
    assert_eq!(data.as_array().unwrap().len(), 2);
    assert_eq!(
        data[0]["content"][0]["content"][0],
        json!({"type": "text", "text": "Go", "marks": [{"type": "link", "attrs": {"href": "http://x.io"}}]})
    );
    assert_eq!(
        data[1]["content"][0]["content"][0],
        json!({"type": "text", "text": "a|b", "marks": [{"type": "code"}]})
    );
}

#[test]
fn test_table_cell_with_image_parameters() {
    let conversion = convert("|!a.png|thumbnail!|b|");
    assert!(conversion.diagnostics.is_empty());
    let blocks = content("|!a.png|thumbnail!|b|");
    let cells = blocks[0]["content"][0]["content"].as_array().unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0]["content"][0]["content"][0]["type"], "mediaSingle");
    assert_eq!(
        cells[0]["content"][0]["content"][0]["content"][0]["attrs"]["url"],
        "a.png"
    );
    assert_eq!(cells[1]["content"][0]["content"][0]["text"], "b");
}

#[test]
fn test_rows_may_differ_in_length() {
    let blocks = content("|a|b|c|\n|d|");
    assert_eq!(blocks[0]["content"][0]["content"].as_array().unwrap().len(), 3);
    assert_eq!(blocks[0]["content"][1]["content"].as_array().unwrap().len(), 1);
}

#[test]
fn test_table_without_cells_degrades_to_paragraph() {
    let conversion = convert("|\n||");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::MalformedTable]);
    assert_eq!(
        conversion.document.content,
        vec![Block::paragraph(vec![Inline::text("| ||")])]
    );
}

#[test]
fn test_empty_table_row_is_skipped() {
    let conversion = convert("||a||\n||||\n|b|");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::MalformedTable]);
    let Block::Table(table) = &conversion.document.content[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.content.len(), 2);
}

#[test]
fn test_single_line_blockquote() {
    assert_eq!(
        content("bq. Quoted _words_"),
        json!([{
            "type": "blockquote",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Quoted "},
                    {"type": "text", "text": "words", "marks": [{"type": "em"}]}
                ]
            }]
        }])
    );
}

#[test]
fn test_quote_block() {
    assert_eq!(
        content("{quote}\nThis is quoted.\nSecond line.\n{quote}"),
        json!([{"type": "blockquote", "content": [para("This is quoted. Second line.")]}])
    );
}

#[test]
fn test_panels() {
    assert_eq!(
        content("{panel:title=Important Note}\nLine one.\n\nLine two.\n{panel}"),
        json!([{
            "type": "panel",
            "attrs": {"panelType": "info"},
            "content": [para("Important Note"), para("Line one."), para("Line two.")]
        }])
    );
    assert_eq!(
        content("{panel}\nBefore\n{code}\nx = *1*\n{code}\nAfter\n{panel}"),
        json!([{
            "type": "panel",
            "attrs": {"panelType": "info"},
            "content": [para("Before"), para("{code}\nx = *1*\n{code}"), para("After")]
        }])
    );
    assert!(
        convert("{panel}\n{code}\nx\n{code}\n{panel}")
            .diagnostics
            .is_empty()
    );
    assert_eq!(
        content("{panel}{panel}"),
        json!([{"type": "panel", "attrs": {"panelType": "info"}, "content": [para("")]}])
    );
}

#[test]
fn test_paragraph_lines_are_joined() {
    assert_eq!(
        content("line one\n  line two  \n\nnext"),
        json!([para("line one line two"), para("next")])
    );
}

#[test]
fn test_paragraph_stops_at_block() {
    let blocks = content("text\nh2. Head\n* item\n----");
    let types: Vec<_> = blocks
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, vec!["paragraph", "heading", "bulletList", "rule"]);
}

#[test]
fn test_inline_nodes_in_paragraph() {
    assert_eq!(
        content("Hi [~jdoe], see !https://x.io/a.png! and a\\\\break x^2^ H~2~O"),
        json!([{
            "type": "paragraph",
            "content": [
                {"type": "text", "text": "Hi "},
                {"type": "mention", "attrs": {"id": "", "text": "@jdoe"}},
                {"type": "text", "text": ", see "},
                {"type": "mediaSingle", "content": [{
                    "type": "media",
                    "attrs": {"type": "external", "url": "https://x.io/a.png", "alt": "https://x.io/a.png"}
                }]},
                {"type": "text", "text": " and a"},
                {"type": "hardBreak"},
                {"type": "text", "text": "break x^2^ H~2~O"}
            ]
        }])
    );
}

#[test]
fn test_inline_diagnostics() {
    let conversion = convert("bad [link|] here\n\n{toc}\n\n{color:red}a {color:blue}b{color}");
    assert_eq!(
        kinds(&conversion),
        vec![
            DiagnosticKind::MalformedLink,
            DiagnosticKind::UnknownMacro,
            DiagnosticKind::NestedFormatting,
        ]
    );
    let lines: Vec<_> = conversion.errors().iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 3, 5]);
    assert_eq!(
        content("bad [link|] here"),
        json!([para("bad [link|] here")])
    );
}

#[test]
fn test_mention_with_pipe_stays_text() {
    let conversion = convert("ask [~alice|x] now");
    assert!(conversion.diagnostics.is_empty());
    assert_eq!(content("ask [~alice|x] now"), json!([para("ask [~alice|x] now")]));
}

#[test]
fn test_unclosed_inline_color() {
    let conversion = convert("{color:red}never closed");
    assert_eq!(kinds(&conversion), vec![DiagnosticKind::UnclosedTag]);
    assert_eq!(content("{color:red}never closed"), json!([para("{color:red}never closed")]));
}

#[test]
fn test_crlf_input() {
    assert_eq!(
        convert("h1. A\r\n\r\ntext\r\nmore\rend").document,
        convert("h1. A\n\ntext\nmore\nend").document
    );
}

#[test]
fn test_conversion_is_deterministic() {
    let input = "h1. Doc\n\n* a\n** b\n\n||x||\n|{color:nope}y{color}|\n{code}\nz";
    let first = convert(input);
    let second = convert(input);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_custom_grammar_matches_standard() {
    let grammar = Grammar::new();
    let input = "h2. Same\n\n*everywhere*";
    assert_eq!(Converter::new(&grammar).convert(input), convert(input));
}

#[test]
fn test_pretty_json_is_same_document() {
    let conversion = convert("h1. Title\n\n# one\n# two");
    let compact: Value = serde_json::from_str(&conversion.to_json().unwrap()).unwrap();
    let pretty: Value = serde_json::from_str(&conversion.to_json_pretty().unwrap()).unwrap();
    assert_eq!(compact, pretty);
    assert!(conversion.to_json_pretty().unwrap().contains("\n  \"type\": \"doc\""));
}

#[test]
fn test_summary_groups_diagnostics() {
    let conversion = convert("{color:x}a{color} {color:y}b{color}\n\nh9. nine");
    let summary = conversion.summary();
    assert_eq!(summary.total_errors, 3);
    assert_eq!(summary.errors_by_kind[&DiagnosticKind::InvalidColor].len(), 2);
    assert_eq!(summary.errors_by_kind[&DiagnosticKind::InvalidHeading].len(), 1);
}
