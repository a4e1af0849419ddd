mod common;

use common::uniform;
use read_along_lib::highlight::span_builder::{build_fragments, match_key, RenderedText, SpanFragment};
use read_along_lib::highlight::scroll::{needs_scroll, Rect};
use read_along_lib::{compose, ComposeOptions, WordSegment};
use rstest::rstest;

fn words(text: &str) -> Vec<WordSegment> {
    compose(&uniform(text), ComposeOptions::default()).words
}

fn texts(parts: &[&str]) -> Vec<RenderedText> {
    parts.iter().map(|p| RenderedText::new(*p)).collect()
}

fn indexes(fragments: &[SpanFragment]) -> Vec<usize> {
    fragments.iter().map(|f| f.word_index).collect()
}

#[rstest]
#[case("Hello,", "hello")]
#[case("\u{201C}Quoted\u{201D}", "quoted")]
#[case("don't", "dont")]
#[case("ÉTÉ", "été")]
#[case("—", "—")]
#[case("...", "...")]
fn test_match_key(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(match_key(raw), expected);
}

#[test]
fn test_fragments_in_single_node() {
    let fragments = build_fragments(&texts(&["hi you"]), &words("hi you"), 6);

    assert_eq!(
        fragments,
        vec![
            SpanFragment { node: 0, start: 0, end: 2, word_index: 0 },
            SpanFragment { node: 0, start: 3, end: 6, word_index: 1 },
        ]
    );
}

#[test]
fn test_fragments_span_node_boundaries() {
    let fragments = build_fragments(&texts(&["sp", "lit ", "word"]), &words("split word"), 6);

    assert_eq!(
        fragments,
        vec![
            SpanFragment { node: 0, start: 0, end: 2, word_index: 0 },
            SpanFragment { node: 1, start: 0, end: 3, word_index: 0 },
            SpanFragment { node: 2, start: 0, end: 4, word_index: 1 },
        ]
    );
}

#[test]
fn test_offsets_count_chars() {
    let fragments = build_fragments(&texts(&["café au lait"]), &words("café lait"), 6);

    assert_eq!(fragments[1], SpanFragment { node: 0, start: 8, end: 12, word_index: 1 });
}

#[test]
fn test_lookahead_bounds_unconfirmed_matches() {
    let rendered = texts(&["one a b c target"]);
    let narrated = words("one target never rendered");

    let found = build_fragments(&rendered, &narrated, 3);
    assert_eq!(indexes(&found), vec![0, 1]);

    let missed = build_fragments(&rendered, &narrated, 2);
    assert_eq!(indexes(&missed), vec![0]);
}

#[test]
fn test_missing_word_does_not_consume_tokens() {
    let fragments = build_fragments(&texts(&["first third"]), &words("first second third"), 6);

    assert_eq!(indexes(&fragments), vec![0, 2]);
}

#[test]
fn test_resyncs_after_long_dom_only_text() {
    let rendered = texts(&[
        "intro ",
        " photo by some agency for this story today and more credits ",
        "body words follow here",
    ]);

    let fragments = build_fragments(&rendered, &words("intro body words follow here"), 6);

    assert_eq!(indexes(&fragments), vec![0, 1, 2, 3, 4]);
    assert_eq!(fragments[1], SpanFragment { node: 2, start: 0, end: 4, word_index: 1 });
}

#[test]
fn test_resync_needs_following_words() {
    let rendered = texts(&["start a b c d e f g h i j the end"]);

    let fragments = build_fragments(&rendered, &words("start the missing words end here"), 2);

    assert_eq!(indexes(&fragments), vec![0]);
}

#[test]
fn test_block_break_separates_tokens() {
    let joined = texts(&["Title", "Body text"]);
    assert_eq!(indexes(&build_fragments(&joined, &words("Title Body text"), 6)), vec![2]);

    let separated = vec![RenderedText::new("Title"), RenderedText::after_break("Body text")];
    let fragments = build_fragments(&separated, &words("Title Body text"), 6);

    assert_eq!(
        fragments,
        vec![
            SpanFragment { node: 0, start: 0, end: 5, word_index: 0 },
            SpanFragment { node: 1, start: 0, end: 4, word_index: 1 },
            SpanFragment { node: 1, start: 5, end: 9, word_index: 2 },
        ]
    );
}

#[test]
fn test_repeated_words_match_in_order() {
    let fragments = build_fragments(&texts(&["the cat and the dog"]), &words("the cat and the dog"), 6);

    let starts: Vec<usize> = fragments.iter().map(|f| f.start).collect();
    assert_eq!(starts, vec![0, 4, 8, 12, 16]);
}

#[test]
fn test_no_scroll_when_word_visible() {
    let viewport = Rect::new(0.0, 600.0);
    assert!(!needs_scroll(Rect::new(300.0, 320.0), viewport, 48.0));
}

#[rstest]
#[case(Rect::new(10.0, 30.0))]
#[case(Rect::new(570.0, 590.0))]
#[case(Rect::new(-100.0, -80.0))]
#[case(Rect::new(900.0, 920.0))]
fn test_scroll_when_word_near_or_past_edges(#[case] word: Rect) {
    assert!(needs_scroll(word, Rect::new(0.0, 600.0), 48.0));
}

#[test]
fn test_small_viewport_ignores_margin() {
    let viewport = Rect::new(0.0, 80.0);
    assert!(!needs_scroll(Rect::new(10.0, 30.0), viewport, 48.0));
    assert!(needs_scroll(Rect::new(70.0, 90.0), viewport, 48.0));
}

#[test]
fn test_collapsed_viewport_never_scrolls() {
    assert!(!needs_scroll(Rect::new(10.0, 30.0), Rect::new(0.0, 0.0), 48.0));
}
