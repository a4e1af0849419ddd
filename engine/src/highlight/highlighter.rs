use crate::config::HighlightConfig;
use crate::highlight::debounce::MutationDebouncer;
use crate::highlight::dom::{TextDom, WordState};
use crate::highlight::span_builder::{build_fragments, RenderedText};
use crate::segments::WordSegment;

/// Word index → the marker nodes holding that word's characters.
///
/// A word split across inline elements owns several markers. Valid only
/// while its markers stay attached.
#[derive(Debug, Clone)]
pub struct WordSpanMap<N> {
    spans: Vec<Vec<N>>,
}

impl<N> Default for WordSpanMap<N> {
    fn default() -> Self {
        Self { spans: Vec::new() }
    }
}

impl<N: Clone + PartialEq> WordSpanMap<N> {
    fn with_words(count: usize) -> Self {
        Self {
            spans: (0..count).map(|_| Vec::new()).collect(),
        }
    }

    pub fn markers(&self, word_index: usize) -> &[N] {
        self.spans.get(word_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn word_count(&self) -> usize {
        self.spans.len()
    }

    pub fn marked_words(&self) -> usize {
        self.spans.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(Vec::is_empty)
    }

    fn first_marker(&self) -> Option<&N> {
        self.spans.iter().find_map(|s| s.first())
    }

    fn last_marker(&self) -> Option<&N> {
        self.spans.iter().rev().find_map(|s| s.last())
    }
}

/// Projects the current word index onto marker elements in a live document.
pub struct WordHighlighter<D: TextDom> {
    config: HighlightConfig,
    root: Option<D::Node>,
    words: Vec<WordSegment>,
    map: WordSpanMap<D::Node>,
    active: bool,
    building: bool,
    needs_bulk: bool,
    builds: u64,
    current: Option<usize>,
    debouncer: MutationDebouncer,
}

impl<D: TextDom> WordHighlighter<D> {
    pub fn new(config: HighlightConfig) -> Self {
        let debouncer = MutationDebouncer::new(config.mutation_debounce_ms);
        Self {
            config,
            root: None,
            words: Vec::new(),
            map: WordSpanMap::default(),
            active: false,
            building: false,
            needs_bulk: true,
            builds: 0,
            current: None,
            debouncer,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn map(&self) -> &WordSpanMap<D::Node> {
        &self.map
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// First marker of the current word, for scroll-follow.
    pub fn current_marker(&self) -> Option<&D::Node> {
        self.current.and_then(|i| self.map.markers(i).first())
    }

    /// True while the highlighter itself is mutating the document.
    pub fn is_building(&self) -> bool {
        self.building
    }

    /// Number of marker builds so far. Hosts with asynchronous change
    /// notifications compare it across a call to discard their own records.
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    /// Starts highlighting `words` inside `root`, wrapping markers right away.
    pub fn activate(&mut self, dom: &mut D, root: D::Node, words: Vec<WordSegment>) {
        if self.active {
            self.unwrap_all(dom);
        }
        self.root = Some(root);
        self.words = words;
        self.active = true;
        self.current = None;
        self.build(dom);
    }

    /// Replaces the word sequence; markers are rebuilt when active.
    pub fn set_words(&mut self, dom: &mut D, words: Vec<WordSegment>) {
        self.words = words;
        self.current = None;
        if self.active {
            self.build(dom);
        }
    }

    /// Removes every marker and restores plain text.
    pub fn deactivate(&mut self, dom: &mut D) {
        if !self.active {
            return;
        }
        self.unwrap_all(dom);
        self.map = WordSpanMap::default();
        self.debouncer.cancel();
        self.active = false;
        self.current = None;
        log::info!("Word highlighting deactivated");
    }

    /// Wraps every matched word in a marker, replacing any previous markers.
    pub fn build(&mut self, dom: &mut D) {
        let Some(root) = self.root.clone() else {
            return;
        };
        self.building = true;

        for marker in dom.markers(&root) {
            dom.unwrap_marker(&marker);
        }
        dom.normalize(&root);

        let runs = dom.text_nodes(&root);
        let texts: Vec<RenderedText> = runs
            .iter()
            .map(|run| RenderedText {
                text: dom.text(&run.node),
                break_before: run.break_before,
            })
            .collect();
        let fragments = build_fragments(&texts, &self.words, self.config.match_lookahead);

        // Right to left, so earlier offsets in each node stay valid.
        let mut map = WordSpanMap::with_words(self.words.len());
        for fragment in fragments.iter().rev() {
            let node = &runs[fragment.node].node;
            let Some(marker) = dom.wrap_text(node, fragment.start, fragment.end, fragment.word_index)
            else {
                continue;
            };
            if let Some(slot) = map.spans.get_mut(fragment.word_index) {
                slot.insert(0, marker);
            }
        }

        log::debug!(
            "Built word map: {} of {} words marked across {} text nodes",
            map.marked_words(),
            self.words.len(),
            runs.len()
        );

        self.map = map;
        self.needs_bulk = true;
        self.builds += 1;
        self.building = false;
    }

    /// Whether the recorded markers are still in the document.
    pub fn is_live(&self, dom: &D) -> bool {
        match (self.map.first_marker(), self.map.last_marker()) {
            (Some(first), Some(last)) => dom.is_attached(first) && dom.is_attached(last),
            _ => true,
        }
    }

    /// Pushes a new word index. Rebuilds first if the markers were detached.
    pub fn update(&mut self, dom: &mut D, index: Option<usize>) {
        if !self.active {
            return;
        }
        if !self.is_live(dom) {
            log::warn!("Word markers detached; rebuilding");
            self.build(dom);
        }

        if self.needs_bulk {
            self.apply_all(dom, index);
            self.needs_bulk = false;
            self.current = index;
            return;
        }

        let previous = self.current;
        if previous == index {
            return;
        }

        match (previous, index) {
            (None, Some(new)) => {
                self.paint_range(dom, 0, new, index);
            }
            (Some(old), Some(new)) if new > old => {
                self.paint_range(dom, old, new, index);
            }
            (Some(old), Some(new)) => {
                self.paint_range(dom, new, old, index);
            }
            (Some(old), None) => {
                self.paint_range(dom, 0, old, index);
            }
            (None, None) => {}
        }
        self.current = index;
    }

    /// Records a document change notification from the host. Ignored while
    /// the highlighter is applying its own mutations. Returns the time at
    /// which [`Self::poll`] should run.
    pub fn on_mutation(&mut self, now_ms: f64) -> Option<f64> {
        if self.building || !self.active {
            return None;
        }
        Some(self.debouncer.notify(now_ms))
    }

    pub fn pending_deadline(&self) -> Option<f64> {
        self.debouncer.deadline()
    }

    /// Runs the debounced check. Returns true when markers were rebuilt.
    pub fn poll(&mut self, dom: &mut D, now_ms: f64) -> bool {
        if !self.debouncer.fire(now_ms) || !self.active {
            return false;
        }
        let had_markers = !self.map.is_empty();
        if had_markers && self.is_live(dom) {
            return false;
        }

        if had_markers {
            log::warn!("Article content replaced; rebuilding word markers");
        } else {
            log::debug!("Article content changed before any word was marked; retrying");
        }
        self.build(dom);
        let current = self.current;
        self.apply_all(dom, current);
        self.needs_bulk = false;
        true
    }

    /// Word index of the marker at or above an event target.
    pub fn word_at(&self, dom: &D, target: &D::Node) -> Option<usize> {
        if !self.active {
            return None;
        }
        dom.marker_word_index(target)
            .filter(|&i| i < self.words.len())
    }

    fn apply_all(&mut self, dom: &mut D, current: Option<usize>) {
        for (index, markers) in self.map.spans.iter().enumerate() {
            let state = WordState::for_index(index, current);
            for marker in markers {
                dom.set_word_state(marker, state);
            }
        }
    }

    /// Re-derives state for words `from..=to` (clamped to the word count).
    fn paint_range(&mut self, dom: &mut D, from: usize, to: usize, current: Option<usize>) {
        let last = to.min(self.map.spans.len().saturating_sub(1));
        if self.map.spans.is_empty() || from > last {
            return;
        }
        for index in from..=last {
            let state = WordState::for_index(index, current);
            for marker in &self.map.spans[index] {
                dom.set_word_state(marker, state);
            }
        }
    }

    fn unwrap_all(&mut self, dom: &mut D) {
        let Some(root) = self.root.clone() else {
            return;
        };
        self.building = true;
        for marker in dom.markers(&root) {
            dom.unwrap_marker(&marker);
        }
        dom.normalize(&root);
        self.building = false;
    }
}
