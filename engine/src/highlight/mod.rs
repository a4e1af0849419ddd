pub mod debounce;
pub mod dom;
mod highlighter;
pub mod memory;
pub mod scroll;
pub mod span_builder;

pub use debounce::MutationDebouncer;
pub use dom::{
    is_block_tag, is_line_break, TextDom, TextRun, WordState, BLOCK_TAGS, MARKER_TAG,
    WORD_INDEX_ATTR, WORD_STATE_ATTR,
};
pub use highlighter::{WordHighlighter, WordSpanMap};
pub use memory::{MemoryDom, NodeId};
pub use span_builder::RenderedText;
