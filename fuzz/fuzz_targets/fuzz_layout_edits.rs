//! Fuzz target for incremental line layout.
//!
//! Applies arbitrary edit sequences and checks that the patched line cache
//! matches a cache laid out from scratch after every step.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use richlayout::{
    CharStyle, LineCache, LineHeight, MonospaceMetrics, ParagraphStyle, ParagraphedBuffer,
    TextPolicy, WrapMode,
};

const METRICS: MonospaceMetrics = MonospaceMetrics::new(10, 16, 4);
const ALPHABET: &[char] = &['a', 'b', ' ', ' ', '.', '\t', '\n', '\u{b}', '\u{1}'];
const SIZES: &[u16] = &[8, 12, 16, 24, 32];

#[derive(Debug, Arbitrary)]
enum Edit {
    Insert { at: u16, chars: Vec<u8> },
    Delete { at: u16, len: u8 },
    Bold { at: u16, len: u8 },
    Resize { at: u16, len: u8, size: u8 },
    Indent { at: u16, indent: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    wrap: u8,
    variable: bool,
    width: u8,
    edits: Vec<Edit>,
}

fn text_of(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| ALPHABET[usize::from(b) % ALPHABET.len()])
        .collect()
}

fuzz_target!(|input: Input| {
    let wrap = match input.wrap % 3 {
        0 => WrapMode::None,
        1 => WrapMode::Char,
        _ => WrapMode::Word,
    };
    let height = if input.variable {
        LineHeight::Variable
    } else {
        LineHeight::Fixed
    };
    let policy = TextPolicy::default().with_wrap(wrap).with_line_height(height);
    let Ok(mut text) = ParagraphedBuffer::with_text("", policy) else {
        return;
    };
    let width = i32::from(input.width) + 10;
    let mut cache = LineCache::new(width);
    if cache.validate(&text, &METRICS).is_err() {
        return;
    }

    for edit in input.edits.iter().take(64) {
        let len = text.len();
        let clamp = |at: u16| usize::from(at).min(len);
        let change = match edit {
            Edit::Insert { at, chars } => {
                let at = clamp(*at);
                text.replace_str(at, at, &text_of(chars))
            }
            Edit::Delete { at, len: n } => {
                let at = clamp(*at);
                text.replace_str(at, (at + usize::from(*n)).min(len), "")
            }
            Edit::Bold { at, len: n } => {
                let at = clamp(*at);
                let end = (at + usize::from(*n)).min(len);
                text.set_style(at, end, CharStyle::builder().bold().build())
            }
            Edit::Resize { at, len: n, size } => {
                let at = clamp(*at);
                let end = (at + usize::from(*n)).min(len);
                let size = SIZES[usize::from(*size) % SIZES.len()];
                text.set_style(at, end, CharStyle::sized(size))
            }
            Edit::Indent { at, indent } => {
                let at = clamp(*at);
                let Ok(style) = ParagraphStyle::builder()
                    .left_indent(i32::from(*indent % 40))
                    .build()
                else {
                    continue;
                };
                text.set_paragraph_style(at, at, style)
            }
        };
        let Ok(change) = change else { continue };
        cache
            .update(&text, &METRICS, &change)
            .expect("update after a valid edit");

        let mut fresh = LineCache::new(width);
        fresh.validate(&text, &METRICS).expect("full layout");
        assert_eq!(
            cache.entries().expect("valid cache"),
            fresh.entries().expect("valid cache"),
            "incremental layout diverged for {:?}",
            text.text()
        );
        assert_eq!(cache.height().ok(), fresh.height().ok());
        for i in 0..fresh.line_count().unwrap_or(0) {
            assert_eq!(cache.line(&text, i).ok(), fresh.line(&text, i).ok());
        }
    }
});
