//! Word and paragraph offset tables for narration alignment.
//!
//! A narration engine reports progress as an offset into the flattened text
//! it was handed. The tables built here turn that offset back into a word
//! index (binary search over word starts) and a paragraph index (search over
//! cumulative paragraph word counts). Everything is computed once per text
//! and shared read-only for the lifetime of a narration session.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use ts_rs::TS;

use crate::error::SpeechError;

// U+FEFF is not Unicode White_Space, but speech engines and browsers treat a
// byte order mark as a separator, so it never starts or joins a word.
static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s\x{FEFF}]+").unwrap());

const PARAGRAPH_BREAK: char = '\n';

/// Unit a narration engine counts offsets in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OffsetUnit {
    /// Unicode scalar values.
    #[default]
    Char,
    /// UTF-8 bytes.
    Byte,
    /// UTF-16 code units (what browser speech engines report).
    Utf16,
}

impl OffsetUnit {
    fn width(self, ch: char) -> usize {
        match self {
            OffsetUnit::Char => 1,
            OffsetUnit::Byte => ch.len_utf8(),
            OffsetUnit::Utf16 => ch.len_utf16(),
        }
    }

    /// Length of `text` measured in this unit.
    pub fn measure(self, text: &str) -> usize {
        match self {
            OffsetUnit::Byte => text.len(),
            _ => text.chars().map(|ch| self.width(ch)).sum(),
        }
    }
}

impl std::fmt::Display for OffsetUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OffsetUnit::Char => "char",
            OffsetUnit::Byte => "byte",
            OffsetUnit::Utf16 => "utf16",
        };
        write!(f, "{}", label)
    }
}

/// Start offset of every word, strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordOffsetTable {
    offsets: Vec<usize>,
}

impl WordOffsetTable {
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, word_idx: usize) -> Option<usize> {
        self.offsets.get(word_idx).copied()
    }

    pub fn find_word_index(&self, offset: usize) -> Option<usize> {
        find_word_index(&self.offsets, offset)
    }
}

/// One line of the source text and the word indices it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParagraphDescriptor {
    pub text: String,
    pub words: Vec<String>,
    /// Index of the first word after this paragraph.
    pub words_offset: usize,
    /// Index of this paragraph's first word.
    pub prev_words_offset: usize,
}

impl ParagraphDescriptor {
    pub fn word_count(&self) -> usize {
        self.words_offset.saturating_sub(self.prev_words_offset)
    }

    pub fn word_range(&self) -> Range<usize> {
        self.prev_words_offset..self.words_offset
    }

    pub fn contains_word(&self, word_idx: usize) -> bool {
        self.word_range().contains(&word_idx)
    }
}

/// Record the start of every maximal non-whitespace run in `text`.
///
/// A byte order mark counts as whitespace: `"\u{FEFF}Hello"` yields `[1]`.
/// Offsets are expressed in `unit`. Empty or all-whitespace input yields an
/// empty table.
pub fn build_word_offsets(text: &str, unit: OffsetUnit) -> WordOffsetTable {
    let mut offsets = Vec::new();
    let mut cursor_byte = 0usize;
    let mut cursor_unit = 0usize;

    for found in RE_WORD.find_iter(text) {
        let start = found.start();
        cursor_unit += unit.measure(&text[cursor_byte..start]);
        cursor_byte = start;
        offsets.push(cursor_unit);
    }

    WordOffsetTable { offsets }
}

/// Split `text` on line breaks and accumulate per-paragraph word counts.
///
/// Empty paragraphs are kept, so the result always has
/// `text.split('\n').count()` entries and is never empty.
pub fn build_paragraphs(text: &str) -> Vec<ParagraphDescriptor> {
    let mut words_offset = 0usize;

    text.split(PARAGRAPH_BREAK)
        .map(|line| {
            let words: Vec<String> = RE_WORD
                .find_iter(line)
                .map(|found| found.as_str().to_string())
                .collect();
            let prev_words_offset = words_offset;
            words_offset += words.len();
            ParagraphDescriptor {
                text: line.to_string(),
                words,
                words_offset,
                prev_words_offset,
            }
        })
        .collect()
}

/// Index of the word whose span contains `offset`.
///
/// Offsets before the first word resolve to word 0 and offsets past the last
/// word start resolve to the last word. An exact hit on a word start returns
/// that word. Returns `None` only for an empty table.
pub fn find_word_index(offsets: &[usize], offset: usize) -> Option<usize> {
    if offsets.is_empty() {
        return None;
    }
    let starts_at_or_before = offsets.partition_point(|&start| start <= offset);
    Some(starts_at_or_before.saturating_sub(1))
}

/// Index of the paragraph containing `word_idx`, or `None` past the end.
pub fn paragraph_index_for_word(
    paragraphs: &[ParagraphDescriptor],
    word_idx: usize,
) -> Option<usize> {
    let idx = paragraphs.partition_point(|paragraph| paragraph.words_offset <= word_idx);
    (idx < paragraphs.len()).then_some(idx)
}

/// Resolved position for one boundary offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub word: Option<usize>,
    pub paragraph: Option<usize>,
}

/// Both tables for one text, built together.
#[derive(Debug, Clone)]
pub struct TextIndex {
    unit: OffsetUnit,
    text_len: usize,
    word_offsets: WordOffsetTable,
    paragraphs: Vec<ParagraphDescriptor>,
}

impl TextIndex {
    pub fn build(text: &str, unit: OffsetUnit) -> Self {
        Self {
            unit,
            text_len: unit.measure(text),
            word_offsets: build_word_offsets(text, unit),
            paragraphs: build_paragraphs(text),
        }
    }

    pub fn unit(&self) -> OffsetUnit {
        self.unit
    }

    /// Text length in the index's offset unit.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn word_offsets(&self) -> &WordOffsetTable {
        &self.word_offsets
    }

    pub fn paragraphs(&self) -> &[ParagraphDescriptor] {
        &self.paragraphs
    }

    pub fn word_count(&self) -> usize {
        self.word_offsets.len()
    }

    /// Reject offsets that point past the end of the text.
    pub fn checked_offset(&self, offset: usize) -> Result<usize, SpeechError> {
        if offset > self.text_len {
            return Err(SpeechError::IndexOutOfRange {
                offset,
                len: self.text_len,
            });
        }
        Ok(offset)
    }

    pub fn resolve(&self, offset: usize) -> Resolution {
        let word = self.word_offsets.find_word_index(offset);
        let paragraph = word.and_then(|word| paragraph_index_for_word(&self.paragraphs, word));
        Resolution { word, paragraph }
    }

    /// Token text of word `word_idx`.
    pub fn word_at(&self, word_idx: usize) -> Option<&str> {
        let paragraph = paragraph_index_for_word(&self.paragraphs, word_idx)?;
        let paragraph = &self.paragraphs[paragraph];
        paragraph
            .words
            .get(word_idx - paragraph.prev_words_offset)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "Hello world",
        "  leading and trailing  ",
        "Line one\nLine two",
        "\n\nA\n\nB C\n",
        "tabs\tand\u{00A0}nbsp",
        "naïve café — déjà vu",
        "emoji 🎧 narration 📖 done",
    ];

    #[test]
    fn hello_world_offsets_and_paragraph() {
        let offsets = build_word_offsets("Hello world", OffsetUnit::Char);
        assert_eq!(offsets.as_slice(), &[0, 6]);

        let paragraphs = build_paragraphs("Hello world");
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].words, vec!["Hello", "world"]);
        assert_eq!(paragraphs[0].words_offset, 2);
        assert_eq!(paragraphs[0].prev_words_offset, 0);
    }

    #[test]
    fn byte_order_mark_separates_words() {
        let text = "\u{FEFF}Hello\u{FEFF}world";
        assert_eq!(build_word_offsets(text, OffsetUnit::Char).as_slice(), &[1, 7]);
        assert_eq!(build_word_offsets(text, OffsetUnit::Byte).as_slice(), &[3, 11]);
        assert_eq!(build_paragraphs(text)[0].words, vec!["Hello", "world"]);
    }

    #[test]
    fn hand_built_descriptor_with_inverted_bounds_counts_zero_words() {
        let descriptor = ParagraphDescriptor {
            text: String::new(),
            words: Vec::new(),
            words_offset: 1,
            prev_words_offset: 4,
        };
        assert_eq!(descriptor.word_count(), 0);
        assert!(descriptor.word_range().is_empty());
        assert!(!descriptor.contains_word(2));
    }

    #[test]
    fn two_lines_accumulate_word_offsets() {
        let paragraphs = build_paragraphs("Line one\nLine two");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!((paragraphs[0].prev_words_offset, paragraphs[0].words_offset), (0, 2));
        assert_eq!((paragraphs[1].prev_words_offset, paragraphs[1].words_offset), (2, 4));
    }

    #[test]
    fn empty_text_has_no_words_and_one_paragraph() {
        assert!(build_word_offsets("", OffsetUnit::Char).is_empty());
        let paragraphs = build_paragraphs("");
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].words.is_empty());
        assert_eq!(paragraphs[0].words_offset, 0);
    }

    #[test]
    fn blank_lines_are_kept_as_empty_paragraphs() {
        let paragraphs = build_paragraphs("\n\nA\n\nB C\n");
        let offsets: Vec<(usize, usize)> = paragraphs
            .iter()
            .map(|p| (p.prev_words_offset, p.words_offset))
            .collect();
        assert_eq!(offsets, vec![(0, 0), (0, 0), (0, 1), (1, 1), (1, 3), (3, 3)]);
    }

    #[test]
    fn table_length_matches_token_count_and_increases() {
        for sample in SAMPLES {
            let table = build_word_offsets(sample, OffsetUnit::Char);
            assert_eq!(table.len(), sample.split_whitespace().count(), "{sample:?}");
            assert!(
                table.as_slice().windows(2).all(|pair| pair[0] < pair[1]),
                "{sample:?}"
            );
        }
    }

    #[test]
    fn paragraph_word_counts_sum_to_table_length() {
        for sample in SAMPLES {
            let table = build_word_offsets(sample, OffsetUnit::Char);
            let paragraphs = build_paragraphs(sample);
            let total: usize = paragraphs.iter().map(ParagraphDescriptor::word_count).sum();
            assert_eq!(total, table.len(), "{sample:?}");
            assert_eq!(paragraphs.len(), sample.split('\n').count());
            assert_eq!(paragraphs.last().map(|p| p.words_offset), Some(table.len()));
            for pair in paragraphs.windows(2) {
                assert_eq!(pair[1].prev_words_offset, pair[0].words_offset);
            }
        }
    }

    #[test]
    fn find_word_index_hits_every_word_start() {
        for sample in SAMPLES {
            let table = build_word_offsets(sample, OffsetUnit::Char);
            for (idx, &start) in table.as_slice().iter().enumerate() {
                assert_eq!(find_word_index(table.as_slice(), start), Some(idx));
            }
        }
    }

    #[test]
    fn find_word_index_clamps_both_ends() {
        let table = build_word_offsets("  alpha beta gamma", OffsetUnit::Char);
        assert_eq!(table.as_slice(), &[2, 8, 13]);
        assert_eq!(find_word_index(table.as_slice(), 0), Some(0));
        assert_eq!(find_word_index(table.as_slice(), 1), Some(0));
        assert_eq!(find_word_index(table.as_slice(), 7), Some(0));
        assert_eq!(find_word_index(table.as_slice(), 12), Some(1));
        assert_eq!(find_word_index(table.as_slice(), 13), Some(2));
        assert_eq!(find_word_index(table.as_slice(), 10_000), Some(2));
    }

    #[test]
    fn find_word_index_on_empty_table_is_none() {
        assert_eq!(find_word_index(&[], 0), None);
        assert_eq!(find_word_index(&[], 42), None);
    }

    #[test]
    fn paragraph_lookup_uses_half_open_ranges() {
        let paragraphs = build_paragraphs("a b\n\nc\nd e f");
        assert_eq!(paragraph_index_for_word(&paragraphs, 0), Some(0));
        assert_eq!(paragraph_index_for_word(&paragraphs, 1), Some(0));
        assert_eq!(paragraph_index_for_word(&paragraphs, 2), Some(2));
        assert_eq!(paragraph_index_for_word(&paragraphs, 3), Some(3));
        assert_eq!(paragraph_index_for_word(&paragraphs, 5), Some(3));
        assert_eq!(paragraph_index_for_word(&paragraphs, 6), None);
    }

    #[test]
    fn offsets_follow_the_requested_unit() {
        let text = "café 🎧 ok";
        assert_eq!(build_word_offsets(text, OffsetUnit::Char).as_slice(), &[0, 5, 7]);
        assert_eq!(build_word_offsets(text, OffsetUnit::Byte).as_slice(), &[0, 6, 11]);
        assert_eq!(build_word_offsets(text, OffsetUnit::Utf16).as_slice(), &[0, 5, 8]);
        assert_eq!(OffsetUnit::Utf16.measure(text), 10);
    }

    #[test]
    fn text_index_resolves_word_and_paragraph() {
        let index = TextIndex::build("Hello world", OffsetUnit::Char);
        let resolved = index.resolve(6);
        assert_eq!(resolved.word, Some(1));
        assert_eq!(resolved.paragraph, Some(0));
        assert_eq!(index.word_at(1), Some("world"));
        assert_eq!(index.word_at(2), None);
    }

    #[test]
    fn checked_offset_rejects_positions_past_the_end() {
        let index = TextIndex::build("Hello world", OffsetUnit::Char);
        assert_eq!(index.checked_offset(11).ok(), Some(11));
        assert!(matches!(
            index.checked_offset(12),
            Err(SpeechError::IndexOutOfRange { offset: 12, len: 11 })
        ));
    }
}
