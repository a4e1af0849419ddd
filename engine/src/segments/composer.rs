use crate::alignment::CharacterAlignment;
use crate::segments::{Composition, GapSegment, Segment, WordSegment};

pub const TAG_OPEN: char = '[';
pub const TAG_CLOSE: char = ']';

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    /// Drop bracketed annotations such as `[laughs]` from both words and gaps.
    pub hide_tags: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self { hide_tags: true }
    }
}

struct PendingWord {
    text: String,
    start_time: f64,
    end_time: f64,
}

#[derive(Default)]
struct Composer {
    composition: Composition,
    word: Option<PendingWord>,
    gap: String,
    tag_depth: usize,
}

impl Composer {
    fn push_char(&mut self, c: char, start: f64, end: f64, options: ComposeOptions) {
        if self.tag_depth > 0 {
            match c {
                TAG_OPEN => self.tag_depth += 1,
                TAG_CLOSE => self.tag_depth -= 1,
                _ => {}
            }
            return;
        }

        if options.hide_tags && c == TAG_OPEN {
            self.flush_word();
            self.gap.clear();
            self.tag_depth = 1;
            return;
        }

        if c.is_whitespace() {
            self.flush_word();
            self.gap.push(c);
            return;
        }

        self.flush_gap();
        match &mut self.word {
            Some(word) => {
                word.text.push(c);
                word.end_time = end.max(word.start_time);
            }
            None => {
                self.word = Some(PendingWord {
                    text: c.to_string(),
                    start_time: start,
                    end_time: end.max(start),
                });
            }
        }
    }

    fn flush_word(&mut self) {
        let Some(word) = self.word.take() else {
            return;
        };
        let segment = WordSegment {
            index: self.composition.words.len(),
            text: word.text,
            start_time: word.start_time,
            end_time: word.end_time,
            segment_index: self.composition.segments.len(),
        };
        self.composition.words.push(segment.clone());
        self.composition.segments.push(Segment::Word(segment));
    }

    fn flush_gap(&mut self) {
        if self.gap.is_empty() {
            return;
        }
        let segment_index = self.composition.segments.len();
        self.composition.segments.push(Segment::Gap(GapSegment {
            text: std::mem::take(&mut self.gap),
            segment_index,
        }));
    }

    fn finish(mut self) -> Composition {
        self.flush_word();
        self.flush_gap();
        self.composition
    }
}

/// Turns a character alignment into ordered word and gap segments in one pass.
pub fn compose(alignment: &CharacterAlignment, options: ComposeOptions) -> Composition {
    if !alignment.is_consistent() {
        log::warn!(
            "Composing from inconsistent alignment; using the first {} characters",
            alignment.len()
        );
    }

    let mut composer = Composer::default();
    for (c, start, end) in alignment.iter() {
        composer.push_char(c, start, end, options);
    }
    let composition = composer.finish();

    log::debug!(
        "Composed {} segments ({} words) from {} characters",
        composition.segments.len(),
        composition.words.len(),
        alignment.len()
    );
    composition
}
