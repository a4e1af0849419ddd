//! The subset of a live document the highlighter reads and writes.

/// Attribute carrying a marker's word index.
pub const WORD_INDEX_ATTR: &str = "data-read-along-word";
/// Attribute carrying a marker's [`WordState`].
pub const WORD_STATE_ATTR: &str = "data-read-along-state";
/// Element name used for markers.
pub const MARKER_TAG: &str = "span";

/// Elements whose edges separate words even without whitespace between them.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn is_line_break(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("br")
}

/// A text node and whether a block edge or line break precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun<N> {
    pub node: N,
    pub break_before: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    Spoken,
    Current,
    Unspoken,
}

impl WordState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spoken => "spoken",
            Self::Current => "current",
            Self::Unspoken => "unspoken",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "spoken" => Some(Self::Spoken),
            "current" => Some(Self::Current),
            "unspoken" => Some(Self::Unspoken),
            _ => None,
        }
    }

    /// State of word `index` while `current` is being spoken.
    pub fn for_index(index: usize, current: Option<usize>) -> Self {
        match current {
            Some(c) if index < c => Self::Spoken,
            Some(c) if index == c => Self::Current,
            _ => Self::Unspoken,
        }
    }
}

/// Document operations needed to build, update and tear down word markers.
///
/// Offsets are in chars of the text node's current content. Implementations
/// that split text must keep the original node as the prefix part, so
/// wrapping ranges of one node from right to left leaves the remaining
/// offsets valid.
pub trait TextDom {
    type Node: Clone + PartialEq;

    /// Text nodes under `root` in document order, skipping non-rendered
    /// content such as scripts and styles. A run is flagged when a block
    /// element edge or a `<br>` lies between it and the previous run.
    fn text_nodes(&self, root: &Self::Node) -> Vec<TextRun<Self::Node>>;

    fn text(&self, node: &Self::Node) -> String;

    /// Wraps `start..end` of a text node in a marker for `word_index` and
    /// returns the marker.
    fn wrap_text(
        &mut self,
        node: &Self::Node,
        start: usize,
        end: usize,
        word_index: usize,
    ) -> Option<Self::Node>;

    fn set_word_state(&mut self, marker: &Self::Node, state: WordState);

    fn is_attached(&self, node: &Self::Node) -> bool;

    /// All markers under `root`, in document order.
    fn markers(&self, root: &Self::Node) -> Vec<Self::Node>;

    /// Replaces a marker with its children.
    fn unwrap_marker(&mut self, marker: &Self::Node);

    /// Merges adjacent text nodes and drops empty ones under `root`.
    fn normalize(&mut self, root: &Self::Node);

    /// Word index of the marker at or above `node`.
    fn marker_word_index(&self, node: &Self::Node) -> Option<usize>;
}
