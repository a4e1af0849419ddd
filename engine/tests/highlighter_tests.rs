mod common;

use common::{hi_you, uniform};
use read_along_lib::highlight::{MemoryDom, MutationDebouncer, NodeId, WordHighlighter, WordState};
use read_along_lib::{compose, ComposeOptions, HighlightConfig, WordSegment};
use read_along_lib::highlight::WordState::{Current, Spoken, Unspoken};

fn words(text: &str) -> Vec<WordSegment> {
    compose(&uniform(text), ComposeOptions::default()).words
}

/// `<article><p>{text}</p></article>` attached to the document.
fn article(dom: &mut MemoryDom, text: &str) -> NodeId {
    let document = dom.document();
    let root = dom.append_element(document, "article");
    let p = dom.append_element(root, "p");
    dom.append_text(p, text);
    root
}

fn highlighter() -> WordHighlighter<MemoryDom> {
    WordHighlighter::new(HighlightConfig::default())
}

fn states(dom: &MemoryDom, root: NodeId) -> Vec<Option<WordState>> {
    dom.marker_summary(root).into_iter().map(|(_, _, s)| s).collect()
}

#[test]
fn test_build_marks_every_word() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let mut hl = highlighter();

    hl.activate(&mut dom, root, compose(&hi_you(), ComposeOptions::default()).words);

    assert!(hl.is_active());
    assert_eq!(hl.map().marked_words(), 2);
    assert_eq!(
        dom.marker_summary(root),
        vec![
            (0, "hi".to_string(), Some(Unspoken)),
            (1, "you".to_string(), Some(Unspoken)),
        ]
    );
    assert_eq!(dom.text_content(root), "hi you");

    hl.update(&mut dom, Some(1));
    assert_eq!(states(&dom, root), vec![Some(Spoken), Some(Current)]);
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "one two three");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("one two three"));
    let first = dom.marker_summary(root);

    hl.build(&mut dom);
    hl.build(&mut dom);

    assert_eq!(dom.marker_summary(root), first);
    assert_eq!(dom.text_content(root), "one two three");
}

#[test]
fn test_forward_and_backward_updates() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "a b c d e");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("a b c d e"));

    hl.update(&mut dom, Some(0));
    hl.update(&mut dom, Some(3));
    assert_eq!(
        states(&dom, root),
        vec![Some(Spoken), Some(Spoken), Some(Spoken), Some(Current), Some(Unspoken)]
    );

    hl.update(&mut dom, Some(1));
    assert_eq!(
        states(&dom, root),
        vec![Some(Spoken), Some(Current), Some(Unspoken), Some(Unspoken), Some(Unspoken)]
    );

    hl.update(&mut dom, Some(4));
    assert_eq!(
        states(&dom, root),
        vec![Some(Spoken), Some(Spoken), Some(Spoken), Some(Spoken), Some(Current)]
    );

    hl.update(&mut dom, None);
    assert_eq!(states(&dom, root), vec![Some(Unspoken); 5]);
    assert_eq!(hl.current(), None);
}

#[test]
fn test_word_split_across_elements() {
    let mut dom = MemoryDom::new();
    let document = dom.document();
    let root = dom.append_element(document, "article");
    let p = dom.append_element(root, "p");
    dom.append_text(p, "hel");
    let b = dom.append_element(p, "b");
    dom.append_text(b, "lo");
    dom.append_text(p, " world");

    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hello world"));
    hl.update(&mut dom, Some(0));

    assert_eq!(hl.map().markers(0).len(), 2);
    assert_eq!(hl.map().markers(1).len(), 1);
    assert_eq!(
        dom.marker_summary(root),
        vec![
            (0, "hel".to_string(), Some(Current)),
            (0, "lo".to_string(), Some(Current)),
            (1, "world".to_string(), Some(Unspoken)),
        ]
    );
    assert_eq!(dom.text_content(root), "hello world");
}

#[test]
fn test_rendered_text_differs_from_narration() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "Hello, dear World!");
    let mut hl = highlighter();

    hl.activate(&mut dom, root, words("hello world"));

    assert_eq!(
        dom.marker_summary(root)
            .into_iter()
            .map(|(i, text, _)| (i, text))
            .collect::<Vec<_>>(),
        vec![(0, "Hello,".to_string()), (1, "World!".to_string())]
    );
}

#[test]
fn test_unmatched_word_left_unmarked() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "alpha gamma");
    let mut hl = highlighter();

    hl.activate(&mut dom, root, words("alpha beta gamma"));
    hl.update(&mut dom, Some(1));

    assert!(hl.map().markers(1).is_empty());
    assert_eq!(
        dom.marker_summary(root),
        vec![
            (0, "alpha".to_string(), Some(Spoken)),
            (2, "gamma".to_string(), Some(Unspoken)),
        ]
    );
}

#[test]
fn test_script_content_is_skipped() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi");
    let script = dom.append_element(root, "script");
    dom.append_text(script, "you");

    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));

    assert_eq!(hl.map().marked_words(), 1);
}

#[test]
fn test_replaced_content_rebuilt_after_debounce() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));
    hl.update(&mut dom, Some(1));

    dom.remove_children(root);
    let p = dom.append_element(root, "p");
    dom.append_text(p, "hi you");
    assert!(!hl.is_live(&dom));

    assert_eq!(hl.on_mutation(0.0), Some(150.0));
    assert_eq!(hl.on_mutation(40.0), Some(190.0));
    assert!(!hl.poll(&mut dom, 150.0));
    assert!(hl.poll(&mut dom, 190.0));

    assert!(hl.is_live(&dom));
    assert_eq!(states(&dom, root), vec![Some(Spoken), Some(Current)]);
    assert_eq!(hl.pending_deadline(), None);
}

#[test]
fn test_reattached_content_is_not_rebuilt() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let p = dom.children(root)[0];
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));
    let before = hl.map().markers(0).to_vec();

    dom.remove_children(root);
    dom.append_child(root, p);
    hl.on_mutation(0.0);

    assert!(!hl.poll(&mut dom, 200.0));
    assert_eq!(hl.map().markers(0), before.as_slice());
}

#[test]
fn test_update_rebuilds_detached_markers() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));

    dom.remove_children(root);
    let p = dom.append_element(root, "p");
    dom.append_text(p, "hi you");
    hl.update(&mut dom, Some(0));

    assert_eq!(states(&dom, root), vec![Some(Current), Some(Unspoken)]);
}

#[test]
fn test_mutations_ignored_when_inactive() {
    let mut hl = highlighter();
    assert_eq!(hl.on_mutation(10.0), None);
    assert_eq!(hl.pending_deadline(), None);
}

#[test]
fn test_deactivate_restores_plain_text() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let p = dom.children(root)[0];
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));
    hl.update(&mut dom, Some(0));

    hl.deactivate(&mut dom);

    assert!(!hl.is_active());
    assert!(dom.marker_summary(root).is_empty());
    assert_eq!(dom.children(p).len(), 1);
    assert_eq!(dom.text_content(p), "hi you");
    assert!(!hl.is_building());
}

#[test]
fn test_word_at_resolves_marked_ancestor() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));

    let marker = hl.map().markers(1)[0];
    let inner = dom.children(marker)[0];
    assert_eq!(hl.word_at(&dom, &inner), Some(1));
    assert_eq!(hl.word_at(&dom, &marker), Some(1));
    assert_eq!(hl.word_at(&dom, &root), None);

    hl.deactivate(&mut dom);
    assert_eq!(hl.word_at(&dom, &root), None);
}

#[test]
fn test_new_words_rebuild_markers() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you there");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));
    assert_eq!(hl.map().word_count(), 2);

    hl.set_words(&mut dom, words("hi you there"));
    assert_eq!(hl.map().marked_words(), 3);
    assert_eq!(dom.marker_summary(root).len(), 3);
}

#[test]
fn test_debouncer_fires_once_per_burst() {
    let mut debouncer = MutationDebouncer::new(100.0);
    assert!(!debouncer.fire(0.0));

    debouncer.notify(0.0);
    debouncer.notify(50.0);
    assert!(debouncer.is_pending());
    assert!(!debouncer.fire(120.0));
    assert!(debouncer.fire(150.0));
    assert!(!debouncer.fire(400.0));

    debouncer.notify(500.0);
    debouncer.cancel();
    assert!(!debouncer.fire(1000.0));
}

#[test]
fn test_build_count_tracks_rebuilds() {
    let mut dom = MemoryDom::new();
    let root = article(&mut dom, "hi you");
    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("hi you"));
    assert_eq!(hl.build_count(), 1);

    hl.update(&mut dom, Some(0));
    hl.update(&mut dom, Some(1));
    assert_eq!(hl.build_count(), 1);

    dom.remove_children(root);
    let p = dom.append_element(root, "p");
    dom.append_text(p, "hi you");
    hl.update(&mut dom, Some(1));
    assert_eq!(hl.build_count(), 2);
}

#[test]
fn test_caption_missing_from_narration_is_skipped() {
    let mut dom = MemoryDom::new();
    let document = dom.document();
    let root = dom.append_element(document, "article");
    let intro = dom.append_element(root, "p");
    dom.append_text(intro, "intro");
    let caption = dom.append_element(root, "figcaption");
    dom.append_text(caption, " photo by some agency for this story today ");
    let body = dom.append_element(root, "p");
    dom.append_text(body, "body words follow here");

    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("intro body words follow here"));

    assert_eq!(hl.map().marked_words(), 5);
    assert_eq!(dom.marker_summary(root)[1].1, "body");
}

#[test]
fn test_adjacent_blocks_do_not_merge_words() {
    let mut dom = MemoryDom::new();
    let document = dom.document();
    let root = dom.append_element(document, "article");
    let heading = dom.append_element(root, "h1");
    dom.append_text(heading, "Title");
    let p = dom.append_element(root, "p");
    dom.append_text(p, "Body text");

    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("Title Body text"));

    assert_eq!(hl.map().marked_words(), 3);
    assert_eq!(dom.text_content(root), "TitleBody text");
}

#[test]
fn test_line_break_separates_words() {
    let mut dom = MemoryDom::new();
    let document = dom.document();
    let root = dom.append_element(document, "article");
    let p = dom.append_element(root, "p");
    dom.append_text(p, "first");
    dom.append_element(p, "br");
    dom.append_text(p, "second");

    let mut hl = highlighter();
    hl.activate(&mut dom, root, words("first second"));

    assert_eq!(
        dom.marker_summary(root)
            .into_iter()
            .map(|(i, text, _)| (i, text))
            .collect::<Vec<_>>(),
        vec![(0, "first".to_string()), (1, "second".to_string())]
    );
}
