//! Maps composed words onto the text of a rendered document.
//!
//! The rendered text is tokenized the same way the composer splits
//! alignment characters (whitespace separates words), then tokens are paired
//! with words in order. Rendering may differ from the narrated text, so the
//! comparison is normalized and each word may skip a few unmatched tokens.
//! When a word is not within that window, a match further on is accepted
//! only if the words after it follow there too.

use crate::segments::WordSegment;

/// Part of a word that lives in one text node. Offsets are chars of that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanFragment {
    pub node: usize,
    pub start: usize,
    pub end: usize,
    pub word_index: usize,
}

/// Words after a far match that must also match for the cursor to jump.
const RESYNC_CONFIRMATIONS: usize = 2;

/// Text of one rendered text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub text: String,
    /// A block edge or line break separates this text from the one before.
    pub break_before: bool,
}

impl RenderedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            break_before: false,
        }
    }

    pub fn after_break(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            break_before: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
    key: String,
}

/// Comparison key: lowercase alphanumerics, or the lowercased raw text when
/// it has none (a lone dash, an ellipsis).
pub fn match_key(text: &str) -> String {
    let key: String = text
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if key.is_empty() {
        text.trim().to_lowercase()
    } else {
        key
    }
}

fn tokenize(texts: &[RenderedText]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, String)> = None;
    let mut offset = 0;

    let flush = |current: &mut Option<(usize, String)>, tokens: &mut Vec<Token>, end: usize| {
        if let Some((start, raw)) = current.take() {
            tokens.push(Token {
                start,
                end,
                key: match_key(&raw),
            });
        }
    };

    for rendered in texts {
        if rendered.break_before {
            flush(&mut current, &mut tokens, offset);
        }
        for c in rendered.text.chars() {
            if c.is_whitespace() {
                flush(&mut current, &mut tokens, offset);
            } else {
                current.get_or_insert_with(|| (offset, String::new())).1.push(c);
            }
            offset += 1;
        }
    }
    flush(&mut current, &mut tokens, offset);
    tokens
}

/// Pairs words with rendered tokens and returns per-node fragments in
/// document order. Unmatched words produce no fragment.
pub fn build_fragments(
    texts: &[RenderedText],
    words: &[WordSegment],
    lookahead: usize,
) -> Vec<SpanFragment> {
    let tokens = tokenize(texts);
    let keys: Vec<String> = words.iter().map(|w| match_key(&w.text)).collect();

    let mut node_starts = Vec::with_capacity(texts.len());
    let mut total = 0;
    for rendered in texts {
        node_starts.push(total);
        total += rendered.text.chars().count();
    }

    let mut fragments = Vec::new();
    let mut cursor = 0;
    let mut unmatched = 0;

    for (position, word) in words.iter().enumerate() {
        let found = find_in_window(&tokens, &keys[position], cursor, lookahead)
            .or_else(|| resync(&tokens, &keys, position, cursor, lookahead));

        let Some(j) = found else {
            unmatched += 1;
            continue;
        };
        cursor = j + 1;
        push_fragments(&mut fragments, &node_starts, texts, &tokens[j], word.index);
    }

    if unmatched > 0 {
        log::debug!(
            "{unmatched} of {} words not found in rendered text",
            words.len()
        );
    }
    fragments
}

fn find_in_window(tokens: &[Token], key: &str, cursor: usize, lookahead: usize) -> Option<usize> {
    (cursor..window_end(tokens, cursor, lookahead)).find(|&j| tokens[j].key == key)
}

fn window_end(tokens: &[Token], cursor: usize, lookahead: usize) -> usize {
    cursor.saturating_add(lookahead).saturating_add(1).min(tokens.len())
}

/// Looks past the window for `keys[position]`, accepting a token only when
/// the next words also match in order after it.
fn resync(
    tokens: &[Token],
    keys: &[String],
    position: usize,
    cursor: usize,
    lookahead: usize,
) -> Option<usize> {
    let from = window_end(tokens, cursor, lookahead);
    let following = &keys[position + 1..(position + 1 + RESYNC_CONFIRMATIONS).min(keys.len())];
    (from..tokens.len())
        .filter(|&j| tokens[j].key == keys[position])
        .find(|&j| {
            let mut cursor = j + 1;
            following.iter().all(|key| match find_in_window(tokens, key, cursor, lookahead) {
                Some(next) => {
                    cursor = next + 1;
                    true
                }
                None => false,
            })
        })
}

fn push_fragments(
    fragments: &mut Vec<SpanFragment>,
    node_starts: &[usize],
    texts: &[RenderedText],
    token: &Token,
    word_index: usize,
) {
    let first = node_starts
        .partition_point(|&start| start <= token.start)
        .saturating_sub(1);

    for node in first..node_starts.len() {
        let node_start = node_starts[node];
        if node_start >= token.end {
            break;
        }
        let node_end = node_start + texts[node].text.chars().count();
        let start = token.start.max(node_start);
        let end = token.end.min(node_end);
        if start < end {
            fragments.push(SpanFragment {
                node,
                start: start - node_start,
                end: end - node_start,
                word_index,
            });
        }
    }
}
