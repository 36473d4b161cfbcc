//! Incremental updates must leave the cache exactly as a full layout would,
//! and report a sensible repaint region.

mod common;

use common::{METRICS, buffer, init_tracing, policy, validated};
use richlayout::{
    CharStyle, LineCache, LineHeight, ParagraphStyle, ParagraphedBuffer, StyleModifier,
    TextPolicy, WrapMode,
};

fn assert_matches_full(cache: &LineCache, text: &ParagraphedBuffer) {
    let fresh = validated(text, cache.requested_width());
    assert_eq!(
        cache.entries().unwrap(),
        fresh.entries().unwrap(),
        "incremental lines differ for {:?}",
        text.text()
    );
    for i in 0..fresh.line_count().unwrap() {
        assert_eq!(cache.line(text, i).unwrap(), fresh.line(text, i).unwrap());
    }
    assert_eq!(cache.height().unwrap(), fresh.height().unwrap());
    assert_eq!(cache.width().unwrap(), fresh.width().unwrap());
}

fn variable(wrap: WrapMode) -> TextPolicy {
    policy(wrap).with_line_height(LineHeight::Variable)
}

#[test]
fn test_typing_a_sentence() {
    init_tracing();
    let sentence = "the quick brown fox jumps over the lazy dog";
    for wrap in [WrapMode::Word, WrapMode::Char, WrapMode::None] {
        let mut text = buffer("", policy(wrap));
        let mut cache = validated(&text, 80);
        for (i, ch) in sentence.chars().enumerate() {
            let change = text.replace_str(i, i, &ch.to_string()).unwrap();
            cache.update(&text, &METRICS, &change).unwrap();
            assert_matches_full(&cache, &text);
        }
        // The first keystroke replaces the whole (empty) text.
        assert_eq!(cache.stats().full_passes, 2);
        assert_eq!(cache.stats().incremental_passes, sentence.len() - 1);
    }
}

#[test]
fn test_backspacing_a_sentence() {
    let sentence = "lorem ipsum dolor sit amet, consectetur adipiscing elit";
    let mut text = buffer(sentence, policy(WrapMode::Word));
    let mut cache = validated(&text, 90);
    while !text.is_empty() {
        let end = text.len();
        let change = text.replace_str(end - 1, end, "").unwrap();
        cache.update(&text, &METRICS, &change).unwrap();
        assert_matches_full(&cache, &text);
    }
    assert_eq!(cache.line_count().unwrap(), 1);
}

#[test]
fn test_split_and_join_paragraphs() {
    let mut text = buffer("first paragraph\nsecond one", variable(WrapMode::Word));
    let indented = ParagraphStyle::builder()
        .left_indent(30)
        .paragraph_space(5)
        .build()
        .unwrap();
    text.set_paragraph_style(16, 16, indented).unwrap();
    let mut cache = validated(&text, 120);

    let change = text.replace_str(5, 5, "\n").unwrap();
    cache.update(&text, &METRICS, &change).unwrap();
    assert_matches_full(&cache, &text);

    // Joining pulls the second paragraph into the first one's style.
    let change = text.replace_str(16, 17, "").unwrap();
    cache.update(&text, &METRICS, &change).unwrap();
    assert_matches_full(&cache, &text);
    assert_eq!(text.paragraph_style_at(16).unwrap().left_indent(), 0);
}

#[test]
fn test_rich_paste_brings_paragraph_styles() {
    let indented = ParagraphStyle::builder().left_indent(10).build().unwrap();
    let mut clip = buffer("x\ny", variable(WrapMode::Word));
    clip.set_paragraph_style(0, 3, indented).unwrap();

    let mut text = buffer("ab\ncd", variable(WrapMode::Word));
    let mut cache = validated(&text, 200);
    let change = text.replace_rich_text(1, 1, &clip).unwrap();
    assert!(change.paragraph_style_changed);
    cache.update(&text, &METRICS, &change).unwrap();

    assert_eq!(text.text(), "ax\nyb\ncd");
    assert_matches_full(&cache, &text);
    assert_eq!(cache.line(&text, 0).unwrap().left, 0);
    assert_eq!(cache.line(&text, 1).unwrap().left, 10);
    assert_eq!(cache.line(&text, 2).unwrap().left, 0);
}

#[test]
fn test_taller_style_moves_following_lines() {
    let mut text = buffer("ab\ncd\nef", variable(WrapMode::Word));
    let mut cache = validated(&text, 200);
    let change = text.set_style(3, 5, CharStyle::sized(32)).unwrap();
    let repaint = cache.update(&text, &METRICS, &change).unwrap();

    assert_eq!(repaint.height_delta, 16);
    assert!(!repaint.full);
    assert!(repaint.to_line_end);
    assert_eq!(repaint.paint_end, text.len());
    assert_eq!(cache.line(&text, 2).unwrap().top, 48);
    assert_matches_full(&cache, &text);
}

#[test]
fn test_fixed_height_paragraph_change_relayouts() {
    let mut text = buffer("ab\ncd", TextPolicy::default());
    let mut cache = validated(&text, 200);
    let spaced = ParagraphStyle::builder().line_space(4).build().unwrap();
    let change = text.set_paragraph_style(0, 1, spaced).unwrap();
    let repaint = cache.update(&text, &METRICS, &change).unwrap();

    assert!(repaint.full);
    assert_eq!(cache.stats().full_passes, 2);
    assert_eq!(cache.line(&text, 1).unwrap().top, 20);
}

#[test]
fn test_constraint_relayouts_everything() {
    let mut text = buffer("ab\ncd", TextPolicy::default());
    let mut cache = validated(&text, 200);
    let change = text
        .set_constraint(Some(StyleModifier::new().font_size(32)))
        .unwrap();
    let repaint = cache.update(&text, &METRICS, &change).unwrap();
    assert!(repaint.full);
    assert_eq!(repaint.height_delta, 32);
    assert_eq!(cache.line(&text, 1).unwrap().top, 32);
}

#[test]
fn test_no_wrap_width_shrinks_with_content() {
    let mut text = buffer("aaaaaaaa\naa", policy(WrapMode::None));
    let mut cache = validated(&text, 50);
    assert_eq!(cache.width().unwrap(), 80);

    let change = text.replace_str(0, 8, "").unwrap();
    let repaint = cache.update(&text, &METRICS, &change).unwrap();
    assert_eq!(repaint.width_delta, -30);
    assert!(repaint.full);
    assert_eq!(cache.width().unwrap(), 50);
    assert_matches_full(&cache, &text);
}

#[test]
fn test_pulled_back_word_repaints_previous_line() {
    let mut text = buffer("aaa bbb cccc", policy(WrapMode::Word));
    let mut cache = validated(&text, 95);
    assert_eq!(cache.line_count().unwrap(), 2);

    let change = text.replace_str(9, 12, "").unwrap();
    let repaint = cache.update(&text, &METRICS, &change).unwrap();
    assert_eq!(cache.line_count().unwrap(), 1);
    assert!(repaint.from_line_begin);
    assert_eq!(repaint.paint_begin, 0);
    assert_eq!(repaint.paint_end, 9);
    assert_eq!(repaint.height_delta, -16);
}

#[test]
fn test_replacing_everything_is_a_full_pass() {
    let mut text = buffer("some text", TextPolicy::default());
    let mut cache = validated(&text, 200);
    let change = text.replace_str(0, 9, "other\ntext").unwrap();
    assert!(change.full_relayout);
    let repaint = cache.update(&text, &METRICS, &change).unwrap();
    assert!(repaint.full);
    assert_eq!(cache.line_count().unwrap(), 2);
}

#[test]
fn test_typing_tabs_after_wrapped_text() {
    let sentence = "ab\tcd ef\tgh\tij kl\tmn";
    for wrap in [WrapMode::Word, WrapMode::Char] {
        let mut text = buffer("", policy(wrap));
        let mut cache = validated(&text, 70);
        for (i, ch) in sentence.chars().enumerate() {
            let change = text.replace_str(i, i, &ch.to_string()).unwrap();
            cache.update(&text, &METRICS, &change).unwrap();
            assert_matches_full(&cache, &text);
        }
        // Removing a word ahead of a tab moves it back to an earlier stop.
        let change = text.replace_str(3, 6, "").unwrap();
        cache.update(&text, &METRICS, &change).unwrap();
        assert_matches_full(&cache, &text);
    }
}

#[test]
fn test_fixed_height_follows_sizes_both_ways() {
    let mut text = buffer("ab cd\nef gh\nij", policy(WrapMode::Word));
    let mut cache = validated(&text, 60);
    for (begin, end, size) in [(3, 5, 24), (7, 8, 32), (3, 5, 8), (7, 8, 16), (0, 14, 12)] {
        let change = text.set_style(begin, end, CharStyle::sized(size)).unwrap();
        cache.update(&text, &METRICS, &change).unwrap();
        assert_matches_full(&cache, &text);
    }
    assert_eq!(cache.height().unwrap(), 3 * 12);
}
