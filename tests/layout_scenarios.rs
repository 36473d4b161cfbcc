//! End-to-end layout scenarios: separators, char and word wrap, incremental
//! rescans and heading normalization.

mod common;

use common::{METRICS, buffer, init_tracing, policy, ranges, validated};
use richlayout::{LineCache, LineHeight, ParagraphStyle, ParagraphStyleModifier, TextPolicy, WrapMode};

#[test]
fn test_separator_splits_paragraphs() {
    init_tracing();
    let text = buffer("ab\ncd", TextPolicy::default());
    let cache = validated(&text, 1000);

    assert_eq!(ranges(&cache, &text), vec![(0, 3), (3, 5)]);
    assert!(cache.line(&text, 0).unwrap().paragraph_end);
    assert!(cache.line(&text, 1).unwrap().paragraph_end);
}

#[test]
fn test_char_wrap_at_margin() {
    init_tracing();
    let text = buffer("aaaaaaaaaa", policy(WrapMode::Char));
    let cache = validated(&text, 55);

    assert_eq!(ranges(&cache, &text), vec![(0, 5), (5, 10)]);
    let first = cache.line(&text, 0).unwrap();
    assert_eq!(first.remaining, 5);
    assert!(!first.paragraph_end);
    assert!(cache.line(&text, 1).unwrap().paragraph_end);
}

#[test]
fn test_word_wrap_breaks_at_space() {
    init_tracing();
    let text = buffer("aaaaa bbbbb", policy(WrapMode::Word));
    let cache = validated(&text, 55);

    assert_eq!(ranges(&cache, &text), vec![(0, 6), (6, 11)]);
    assert_eq!(cache.line(&text, 0).unwrap().remaining, 5);
}

#[test]
fn test_insert_rescans_only_the_edited_line() {
    init_tracing();
    let mut text = buffer("a\nbc\nd", TextPolicy::default());
    let mut cache = validated(&text, 1000);
    assert_eq!(ranges(&cache, &text), vec![(0, 2), (2, 5), (5, 6)]);

    cache.reset_stats();
    let change = text.replace_str(2, 2, "x").unwrap();
    cache.update(&text, &METRICS, &change).unwrap();

    assert_eq!(cache.stats().lines_scanned, 1);
    assert_eq!(cache.stats().incremental_passes, 1);
    assert_eq!(cache.line(&text, 2).unwrap().begin, 6);
    assert_eq!(ranges(&cache, &text), vec![(0, 2), (2, 6), (6, 7)]);
}

#[test]
fn test_heading_space_dropped_with_heading() {
    init_tracing();
    let variable = TextPolicy::default().with_line_height(LineHeight::Variable);
    let mut text = buffer("title\nbody", variable);
    let heading = ParagraphStyle::builder()
        .heading(20)
        .heading_space(8)
        .build()
        .unwrap();
    text.set_paragraph_style(0, 5, heading).unwrap();
    let mut cache = validated(&text, 1000);
    assert_eq!(cache.line(&text, 0).unwrap().left, 28);

    let plain = ParagraphStyle::builder().heading_space(8).build().unwrap();
    let change = text.set_paragraph_style(0, 5, plain).unwrap();
    assert!(change.paragraph_style_changed);
    let style = text.paragraph_style_at(0).unwrap();
    assert!(!style.has_heading());
    assert_eq!(style.heading_space(), 0);

    cache.update(&text, &METRICS, &change).unwrap();
    assert_eq!(cache.line(&text, 0).unwrap().left, 0);
}

#[test]
fn test_heading_space_dropped_by_modifier() {
    let variable = TextPolicy::default().with_line_height(LineHeight::Variable);
    let mut text = buffer("title\nbody", variable);
    let heading = ParagraphStyle::builder()
        .heading(20)
        .heading_space(8)
        .build()
        .unwrap();
    text.set_paragraph_style(0, 0, heading).unwrap();

    let modifier = ParagraphStyleModifier::new().no_heading().heading_space(3);
    text.modify_paragraph_style(0, 0, &modifier).unwrap();
    assert_eq!(text.paragraph_style_at(0).unwrap().heading_space(), 0);
    // The second paragraph was never touched.
    assert!(!text.paragraph_style_at(6).unwrap().has_heading());
}

#[test]
fn test_indents_narrow_the_line() {
    let variable = TextPolicy::default()
        .with_line_height(LineHeight::Variable)
        .with_wrap(WrapMode::Char);
    let mut text = buffer("aaaaaaaaaa\nbbbbbbbbbb", variable);
    let indented = ParagraphStyle::builder()
        .left_indent(20)
        .right_indent(30)
        .build()
        .unwrap();
    text.set_paragraph_style(0, 1, indented).unwrap();
    let cache = validated(&text, 100);

    // 100 - 20 - 30 leaves room for 5 characters in the first paragraph.
    assert_eq!(
        ranges(&cache, &text),
        vec![(0, 5), (5, 11), (11, 21)]
    );
    assert_eq!(cache.line(&text, 0).unwrap().left, 20);
    assert_eq!(cache.line(&text, 2).unwrap().left, 0);
}

#[test]
fn test_line_break_keeps_paragraph() {
    let text = buffer("ab\u{b}cd\nef", TextPolicy::default());
    let cache = validated(&text, 1000);
    assert_eq!(ranges(&cache, &text), vec![(0, 3), (3, 6), (6, 8)]);
    assert!(!cache.line(&text, 0).unwrap().paragraph_end);
    assert!(cache.line(&text, 1).unwrap().paragraph_end);
}

#[test]
fn test_custom_separator() {
    let policy = TextPolicy::default().with_paragraph_separator('|');
    let text = buffer("ab|cd\nef", policy);
    let cache = validated(&text, 1000);
    // '\n' is an unsupported control character here, drawn as a placeholder.
    assert_eq!(ranges(&cache, &text), vec![(0, 3), (3, 8)]);
    assert_eq!(cache.line(&text, 1).unwrap().remaining, 1000 - 50);
}

#[test]
fn test_validate_is_idempotent() {
    let text = buffer("one two three four five six", policy(WrapMode::Word));
    let mut cache = LineCache::new(70);
    cache.validate(&text, &METRICS).unwrap();
    let first = cache.entries().unwrap().to_vec();
    cache.validate(&text, &METRICS).unwrap();
    assert_eq!(cache.entries().unwrap(), first.as_slice());
    assert_eq!(cache.stats().full_passes, 1);
}
