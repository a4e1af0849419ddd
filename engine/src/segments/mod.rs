pub mod composer;
pub mod locator;

pub use composer::{compose, ComposeOptions};
pub use locator::{locate, locate_from};

use serde::Serialize;

/// A timed word. `index` counts words only; `segment_index` counts every
/// segment, gaps included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordSegment {
    pub index: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub segment_index: usize,
}

impl WordSegment {
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// An untimed whitespace run between two words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSegment {
    pub text: String,
    pub segment_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Word(WordSegment),
    Gap(GapSegment),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Self::Word(word) => &word.text,
            Self::Gap(gap) => &gap.text,
        }
    }

    pub fn segment_index(&self) -> usize {
        match self {
            Self::Word(word) => word.segment_index,
            Self::Gap(gap) => gap.segment_index,
        }
    }

    pub fn as_word(&self) -> Option<&WordSegment> {
        match self {
            Self::Word(word) => Some(word),
            Self::Gap(_) => None,
        }
    }
}

/// Output of [`compose`]: every segment in order, plus the words alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Composition {
    pub segments: Vec<Segment>,
    pub words: Vec<WordSegment>,
}

impl Composition {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn word(&self, index: usize) -> Option<&WordSegment> {
        self.words.get(index)
    }

    /// Splits the segments after the given word: spoken includes the word.
    pub fn split_at_word(&self, word_index: Option<usize>) -> (&[Segment], &[Segment]) {
        let cut = word_index
            .and_then(|i| self.words.get(i))
            .map(|w| w.segment_index + 1)
            .unwrap_or(0)
            .min(self.segments.len());
        self.segments.split_at(cut)
    }

    pub fn text(&self) -> String {
        segments_to_text(&self.segments)
    }
}

pub fn segments_to_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::text).collect()
}
