//! Auto-follow decision: scroll only when the current word left the viewport.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Whether `word` sits outside `viewport` shrunk by `margin` on both edges.
/// A viewport smaller than twice the margin uses the raw viewport.
pub fn needs_scroll(word: Rect, viewport: Rect, margin: f64) -> bool {
    if viewport.height() <= 0.0 || word.height() < 0.0 {
        return false;
    }
    let margin = if viewport.height() > margin * 2.0 {
        margin
    } else {
        0.0
    };
    word.top < viewport.top + margin || word.bottom > viewport.bottom - margin
}
