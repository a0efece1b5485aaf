use super::*;

struct FailingMath;

impl MathRenderer for FailingMath {
    fn render(&self, _source: &str) -> Result<String, RenderError> {
        Err(RenderError::new("always fails"))
    }
}

struct EchoMath;

impl MathRenderer for EchoMath {
    fn render(&self, source: &str) -> Result<String, RenderError> {
        Ok(format!("<{}>", source.trim()))
    }
}

fn formatter() -> MessageFormatter {
    MessageFormatter::with_renderer(FormatOptions { math: true }, Box::new(EchoMath))
}

fn count_strong(segments: &[Segment]) -> usize {
    segments
        .iter()
        .filter(|segment| {
            matches!(
                segment,
                Segment::Prose {
                    emphasis: Emphasis::Strong,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn bold_markers_split_into_strong_runs() {
    let segments = formatter().format("Hello **world**");
    assert_eq!(
        segments,
        vec![Segment::plain("Hello "), Segment::strong("world")]
    );
}

#[test]
fn fenced_code_with_language_tag() {
    let segments = formatter().format("intro ```js\ncode()\n``` outro");
    assert_eq!(
        segments,
        vec![
            Segment::plain("intro "),
            Segment::code(Some("js"), "code()\n"),
            Segment::plain(" outro"),
        ]
    );
}

#[test]
fn code_without_tag_line_keeps_whole_body() {
    let segments = formatter().format("```\nlet x = 1;\n```");
    assert_eq!(segments, vec![Segment::code(None, "let x = 1;\n")]);

    let segments = formatter().format("run ```ls -la``` now");
    assert_eq!(
        segments,
        vec![
            Segment::plain("run "),
            Segment::code(None, "ls -la"),
            Segment::plain(" now"),
        ]
    );
}

#[test]
fn code_bodies_are_not_parsed_for_bold_or_math() {
    let body = "a ** b ** c \\[x\\]\n";
    let segments = formatter().format(&format!("```python\n{body}```"));
    assert_eq!(segments, vec![Segment::code(Some("python"), body)]);
}

#[test]
fn unterminated_fence_falls_back_to_prose() {
    let segments = formatter().format("before ```rust\nfn main() {");
    assert_eq!(
        segments,
        vec![
            Segment::plain("before "),
            Segment::plain("rust\nfn main() {"),
        ]
    );
}

#[test]
fn fence_parity_alternates_prose_and_code() {
    let text = "p0```a\nc1```p2```b\nc3```p4";
    let segments = formatter().format(text);
    let kinds: Vec<bool> = segments.iter().map(Segment::is_code).collect();
    assert_eq!(kinds, vec![false, true, false, true, false]);

    // one more fence: the trailing span stays prose
    let segments = formatter().format(&format!("{text}```p5"));
    let kinds: Vec<bool> = segments.iter().map(Segment::is_code).collect();
    assert_eq!(kinds, vec![false, true, false, true, false, false]);
    assert_eq!(segments.last(), Some(&Segment::plain("p5")));
}

#[test]
fn bold_parity_counts_pairs() {
    for pairs in 0..5 {
        let text = "x **b** ".repeat(pairs);
        assert_eq!(count_strong(&formatter().format(&text)), pairs);
    }
}

#[test]
fn adjacent_markers_still_count_as_a_pair() {
    let segments = formatter().format("a****b");
    assert_eq!(
        segments,
        vec![Segment::plain("a"), Segment::strong(""), Segment::plain("b")]
    );

    for text in ["x **** y **z**", "****", "**a****b**"] {
        let markers = text.matches("**").count();
        assert_eq!(count_strong(&formatter().format(text)), markers / 2, "{text}");
    }
}

#[test]
fn stray_bold_marker_shifts_parity_without_failing() {
    let segments = formatter().format("a ** b **c** d");
    assert_eq!(
        segments,
        vec![
            Segment::plain("a "),
            Segment::strong(" b "),
            Segment::plain("c"),
            Segment::strong(" d"),
        ]
    );
}

#[test]
fn math_is_extracted_before_bold() {
    let segments = formatter().format("**a** \\[ x ** y \\] **b**");
    assert_eq!(
        segments,
        vec![
            Segment::strong("a"),
            Segment::plain(" "),
            Segment::Math {
                source: " x ** y ".into(),
                markup: "<x ** y>".into(),
            },
            Segment::plain(" "),
            Segment::strong("b"),
        ]
    );
}

#[test]
fn math_spans_newlines_and_is_non_greedy() {
    let segments = formatter().format("\\[a\nb\\] mid \\[c\\]");
    assert_eq!(
        segments,
        vec![
            Segment::Math {
                source: "a\nb".into(),
                markup: "<a\nb>".into(),
            },
            Segment::plain(" mid "),
            Segment::Math {
                source: "c".into(),
                markup: "<c>".into(),
            },
        ]
    );
}

#[test]
fn unterminated_math_stays_prose() {
    let segments = formatter().format("see \\[x + ");
    assert_eq!(segments, vec![Segment::plain("see \\[x + ")]);
}

#[test]
fn math_disabled_leaves_delimiters_in_prose() {
    let formatter = MessageFormatter::with_renderer(FormatOptions { math: false }, Box::new(EchoMath));
    let segments = formatter.format("\\[x\\] and **y**");
    assert_eq!(
        segments,
        vec![Segment::plain("\\[x\\] and "), Segment::strong("y")]
    );
}

#[test]
fn failed_math_degrades_to_raw_text() {
    let formatter =
        MessageFormatter::with_renderer(FormatOptions { math: true }, Box::new(FailingMath));
    let segments = formatter.format("before \\[\\frac{1}{\\] after **bold**");
    assert_eq!(
        segments,
        vec![
            Segment::plain("before "),
            Segment::plain("\\[\\frac{1}{\\]"),
            Segment::plain(" after "),
            Segment::strong("bold"),
        ]
    );
}

#[test]
fn default_renderer_degrades_on_unbalanced_input() {
    let segments = MessageFormatter::default().format("\\[\\frac{1}{2\\] ok");
    assert_eq!(
        segments,
        vec![Segment::plain("\\[\\frac{1}{2\\]"), Segment::plain(" ok")]
    );
}

#[test]
fn default_renderer_typesets_math() {
    let segments = MessageFormatter::default().format("\\[\\alpha^2\\]");
    assert_eq!(
        segments,
        vec![Segment::Math {
            source: "\\alpha^2".into(),
            markup: "α²".into(),
        }]
    );
}

#[test]
fn formatting_is_idempotent() {
    let text = "# Title\n**bold** then ```sh\necho hi\n``` and \\[x^2\\] then ```unclosed";
    let formatter = MessageFormatter::default();
    assert_eq!(formatter.format(text), formatter.format(text));
}

#[test]
fn growing_prefixes_never_panic() {
    let text = "Sure! **Here** is code:\n```rust\nfn main() {}\n```\nand math \\[\\sqrt{2}\\] é ✓";
    let formatter = MessageFormatter::default();
    let mut prefix = String::new();
    for ch in text.chars() {
        prefix.push(ch);
        let _ = formatter.format(&prefix);
    }
    assert_eq!(formatter.format(&prefix), formatter.format(text));
}

#[test]
fn empty_text_yields_no_segments() {
    assert!(formatter().format("").is_empty());
}

#[test]
fn code_blocks_lists_bodies_in_order() {
    let segments = formatter().format("```a\none\n``` x ```b\ntwo\n```");
    assert_eq!(code_blocks(&segments), vec!["one\n", "two\n"]);
}

#[test]
fn deeply_nested_math_falls_back_to_raw_text() {
    let source = format!("{}x{}", "{".repeat(5000), "}".repeat(5000));
    let text = format!("\\[{source}\\] tail");
    let segments = MessageFormatter::default().format(&text);
    assert_eq!(
        segments,
        vec![
            Segment::plain(format!("\\[{source}\\]")),
            Segment::plain(" tail"),
        ]
    );
}
