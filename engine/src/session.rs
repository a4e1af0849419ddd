//! Wires the playback controller to the word highlighter.

use std::rc::Rc;

use crate::alignment::CharacterAlignment;
use crate::config::{EngineConfig, HighlightConfig};
use crate::highlight::{TextDom, WordHighlighter};
use crate::playback::{Clock, MediaEvent, MediaHandle, PlaybackController, PlaybackState};

/// One narrated article: a controller, a highlighter and the document they
/// share.
///
/// Every entry point forwards to the controller and then pushes the
/// resulting word index into the highlighter, so the markers never lag the
/// controller state by more than the call that changed it.
pub struct ReadAlongSession<M, C, D: TextDom> {
    controller: PlaybackController<M, C>,
    highlighter: WordHighlighter<D>,
    dom: D,
    config: HighlightConfig,
    pending_resume_at: Option<f64>,
}

impl<M, C, D> ReadAlongSession<M, C, D>
where
    M: MediaHandle,
    C: Clock,
    D: TextDom,
{
    pub fn new(media: M, clock: C, dom: D, config: EngineConfig) -> Self {
        let controller = PlaybackController::new(media, clock, config.playback, config.compose);
        Self {
            controller,
            highlighter: WordHighlighter::new(config.highlight.clone()),
            dom,
            config: config.highlight,
            pending_resume_at: None,
        }
    }

    pub fn controller(&self) -> &PlaybackController<M, C> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<M, C> {
        &mut self.controller
    }

    pub fn highlighter(&self) -> &WordHighlighter<D> {
        &self.highlighter
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn state(&self) -> &PlaybackState {
        self.controller.state()
    }

    /// Attaches an alignment; when it differs from the current one, the
    /// controller resets and the markers are rebuilt for the new words.
    pub fn set_alignment(&mut self, alignment: Rc<CharacterAlignment>) -> bool {
        if !self.controller.set_alignment(alignment) {
            return false;
        }
        self.pending_resume_at = None;
        let words = self.controller.words().to_vec();
        self.highlighter.set_words(&mut self.dom, words);
        self.sync_highlight();
        true
    }

    /// Turns highlighting on inside `root`.
    pub fn activate_highlighting(&mut self, root: D::Node) {
        let words = self.controller.words().to_vec();
        self.highlighter.activate(&mut self.dom, root, words);
        self.sync_highlight();
        log::info!(
            "Word highlighting active: {} of {} words marked",
            self.highlighter.map().marked_words(),
            self.controller.words().len()
        );
    }

    pub fn deactivate_highlighting(&mut self) {
        self.highlighter.deactivate(&mut self.dom);
    }

    pub fn play(&mut self) {
        self.pending_resume_at = None;
        self.controller.play();
        self.sync_highlight();
    }

    pub fn pause(&mut self) {
        self.pending_resume_at = None;
        self.controller.pause();
        self.sync_highlight();
    }

    pub fn resume(&mut self) {
        self.controller.resume();
        self.sync_highlight();
    }

    pub fn toggle(&mut self) {
        self.pending_resume_at = None;
        self.controller.toggle();
        self.sync_highlight();
    }

    pub fn seek_to_time(&mut self, time: f64) -> f64 {
        let target = self.controller.seek_to_time(time);
        self.sync_highlight();
        target
    }

    pub fn seek_to_word(&mut self, index: usize) -> Option<f64> {
        let target = self.controller.seek_to_word(index);
        self.sync_highlight();
        target
    }

    pub fn start_scrubbing(&mut self) {
        self.controller.start_scrubbing();
    }

    pub fn end_scrubbing(&mut self) {
        self.controller.end_scrubbing();
        self.sync_highlight();
    }

    pub fn running_generation(&self) -> Option<u64> {
        self.controller.running_generation()
    }

    /// One frame of the synchronization loop.
    pub fn tick(&mut self, generation: u64) -> bool {
        let keep_going = self.controller.tick(generation);
        self.sync_highlight();
        keep_going
    }

    pub fn on_media_event(&mut self, event: MediaEvent) {
        self.controller.on_media_event(event);
        self.sync_highlight();
    }

    /// A document change notification. Returns when [`Self::poll_timers`]
    /// should next run, if a check is now pending.
    pub fn on_dom_mutation(&mut self) -> Option<f64> {
        let now = self.controller.now_ms();
        self.highlighter.on_mutation(now)
    }

    /// Handles a pointer press. When it lands on a word marker, seeks there
    /// and schedules a resume shortly after; returns the resume deadline.
    pub fn on_click(&mut self, target: &D::Node) -> Option<f64> {
        let index = self.highlighter.word_at(&self.dom, target)?;
        self.controller.seek_to_word(index)?;
        self.sync_highlight();

        let resume_at = self.controller.now_ms() + self.config.click_resume_delay_ms;
        self.pending_resume_at = Some(resume_at);
        log::debug!("Click-to-seek on word {index}");
        Some(resume_at)
    }

    /// Earliest time a pending timer wants [`Self::poll_timers`] to run.
    pub fn next_deadline(&self) -> Option<f64> {
        match (self.pending_resume_at, self.highlighter.pending_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires the delayed click resume and the debounced rebuild check.
    pub fn poll_timers(&mut self) {
        let now = self.controller.now_ms();
        if self.pending_resume_at.is_some_and(|at| now >= at) {
            self.pending_resume_at = None;
            self.controller.resume();
        }
        if self.highlighter.poll(&mut self.dom, now) {
            log::debug!("Word markers restored after content change");
        }
        self.sync_highlight();
    }

    /// First marker of the current word, for scroll-follow.
    pub fn current_marker(&self) -> Option<&D::Node> {
        self.highlighter.current_marker()
    }

    fn sync_highlight(&mut self) {
        let index = self.controller.state().current_word_index;
        self.highlighter.update(&mut self.dom, index);
    }
}
