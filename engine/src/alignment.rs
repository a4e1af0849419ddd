//! Character-level timing data supplied by the narration service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error("Invalid alignment JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AlignmentError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Parse(_) => "The narration timing data is unreadable. Highlighting is unavailable.",
        }
    }
}

/// Three parallel arrays: one character with its start and end time (seconds).
///
/// Arrays of unequal length are tolerated everywhere; consumers only look at
/// the first [`len`](Self::len) entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAlignment")]
pub struct CharacterAlignment {
    pub characters: Vec<char>,
    pub start_times: Vec<f64>,
    pub end_times: Vec<f64>,
}

/// Wire shape. Entries may hold more than one codepoint; each codepoint
/// inherits the entry's timing.
#[derive(Deserialize)]
struct RawAlignment {
    characters: Vec<String>,
    #[serde(alias = "character_start_times_seconds", alias = "startTimes")]
    start_times: Vec<f64>,
    #[serde(alias = "character_end_times_seconds", alias = "endTimes")]
    end_times: Vec<f64>,
}

impl From<RawAlignment> for CharacterAlignment {
    fn from(raw: RawAlignment) -> Self {
        let shortest = raw
            .characters
            .len()
            .min(raw.start_times.len())
            .min(raw.end_times.len());
        if raw.characters.len() != shortest
            || raw.start_times.len() != shortest
            || raw.end_times.len() != shortest
        {
            log::warn!(
                "Alignment arrays disagree (characters={}, start={}, end={}); truncating to {}",
                raw.characters.len(),
                raw.start_times.len(),
                raw.end_times.len(),
                shortest
            );
        }

        let mut alignment = Self::default();
        for ((entry, start), end) in raw
            .characters
            .iter()
            .zip(&raw.start_times)
            .zip(&raw.end_times)
        {
            for c in entry.chars() {
                alignment.characters.push(c);
                alignment.start_times.push(*start);
                alignment.end_times.push(*end);
            }
        }
        alignment
    }
}

impl CharacterAlignment {
    pub fn new(characters: Vec<char>, start_times: Vec<f64>, end_times: Vec<f64>) -> Self {
        Self {
            characters,
            start_times,
            end_times,
        }
    }

    /// Builds an alignment from text and one `(start, end)` pair per char.
    pub fn from_text(text: &str, times: &[(f64, f64)]) -> Self {
        let characters: Vec<char> = text.chars().collect();
        let (start_times, end_times) = times.iter().copied().unzip();
        Self::new(characters, start_times, end_times)
    }

    pub fn from_json(json: &str) -> Result<Self, AlignmentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Usable length: the shortest of the three arrays.
    pub fn len(&self) -> usize {
        self.characters
            .len()
            .min(self.start_times.len())
            .min(self.end_times.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_consistent(&self) -> bool {
        self.characters.len() == self.start_times.len()
            && self.start_times.len() == self.end_times.len()
    }

    /// Returns a copy with all three arrays cut to the shortest length.
    pub fn truncated(&self) -> Self {
        let len = self.len();
        if !self.is_consistent() {
            log::warn!(
                "Alignment arrays disagree (characters={}, start={}, end={}); truncating to {}",
                self.characters.len(),
                self.start_times.len(),
                self.end_times.len(),
                len
            );
        }
        Self {
            characters: self.characters[..len].to_vec(),
            start_times: self.start_times[..len].to_vec(),
            end_times: self.end_times[..len].to_vec(),
        }
    }

    /// Iterates `(char, start, end)` over the usable length.
    pub fn iter(&self) -> impl Iterator<Item = (char, f64, f64)> + '_ {
        self.characters
            .iter()
            .zip(&self.start_times)
            .zip(&self.end_times)
            .map(|((c, s), e)| (*c, *s, *e))
    }

    /// End time of the last character, or 0 for an empty alignment.
    pub fn content_end(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            len => self.end_times[len - 1],
        }
    }

    pub fn text(&self) -> String {
        self.characters[..self.len()].iter().collect()
    }
}
