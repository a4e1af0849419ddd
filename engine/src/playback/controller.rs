use std::rc::Rc;

use crate::alignment::CharacterAlignment;
use crate::config::PlaybackConfig;
use crate::error::MediaError;
use crate::playback::media::{Clock, MediaEvent, MediaHandle};
use crate::playback::state::PlaybackState;
use crate::segments::{
    compose, locate, locate_from, ComposeOptions, Composition, Segment, WordSegment,
};

/// Lifecycle notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    TimeUpdate {
        current_time: f64,
        word_index: Option<usize>,
    },
    Ended,
    DurationChange(f64),
    AudioError(MediaError),
    Buffering(bool),
}

type Listener = Box<dyn FnMut(&PlaybackEvent)>;

/// Keeps a media handle and a composed alignment in step.
///
/// The controller is the only writer of [`PlaybackState`] and of the handle's
/// position. It is driven from three directions: UI operations (`play`,
/// `seek_to_time`, ...), media notifications ([`Self::on_media_event`]) and
/// the per-frame [`Self::tick`], all on one thread.
pub struct PlaybackController<M, C> {
    media: M,
    clock: C,
    config: PlaybackConfig,
    compose_options: ComposeOptions,
    alignment: Option<Rc<CharacterAlignment>>,
    composition: Rc<Composition>,
    content_end: f64,
    state: PlaybackState,
    last_seek_at: Option<f64>,
    resume_after_seek: bool,
    loop_generation: u64,
    loop_running: bool,
    listeners: Vec<Listener>,
}

impl<M: MediaHandle, C: Clock> PlaybackController<M, C> {
    pub fn new(media: M, clock: C, config: PlaybackConfig, compose_options: ComposeOptions) -> Self {
        let mut controller = Self {
            media,
            clock,
            config,
            compose_options,
            alignment: None,
            composition: Rc::default(),
            content_end: 0.0,
            state: PlaybackState::default(),
            last_seek_at: None,
            resume_after_seek: false,
            loop_generation: 0,
            loop_running: false,
            listeners: Vec::new(),
        };
        controller.state.duration = controller.effective_duration();
        controller
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&PlaybackEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Attaches an alignment. A different `Rc` resets position, word index
    /// and flags before returning, rewinding the media when it replaces a
    /// previous alignment; the same `Rc` is a no-op.
    pub fn set_alignment(&mut self, alignment: Rc<CharacterAlignment>) -> bool {
        if self
            .alignment
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, &alignment))
        {
            return false;
        }

        let replacing = self.alignment.is_some();
        let composition = compose(&alignment, self.compose_options);
        self.content_end = alignment.content_end();
        log::info!(
            "Alignment attached: {} words, content ends at {:.2}s",
            composition.words.len(),
            self.content_end
        );

        self.alignment = Some(alignment);
        self.composition = Rc::new(composition);
        self.last_seek_at = None;
        self.resume_after_seek = false;
        self.state.current_time = 0.0;
        self.state.current_word_index = None;
        self.state.reached_end = false;
        self.state.is_scrubbing = false;
        self.state.duration = self.effective_duration();
        if replacing && self.media.current_time() != 0.0 {
            self.media.set_current_time(0.0);
        }

        if self.state.is_buffering {
            self.state.is_buffering = false;
            self.emit(PlaybackEvent::Buffering(false));
        }
        self.emit(PlaybackEvent::DurationChange(self.state.duration));
        self.emit_time_update();
        if self.state.is_playing {
            self.start_loop();
        } else {
            self.stop_loop();
        }
        true
    }

    pub fn alignment(&self) -> Option<&Rc<CharacterAlignment>> {
        self.alignment.as_ref()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn composition(&self) -> Rc<Composition> {
        Rc::clone(&self.composition)
    }

    pub fn words(&self) -> &[WordSegment] {
        &self.composition.words
    }

    pub fn segments(&self) -> &[Segment] {
        &self.composition.segments
    }

    pub fn content_end(&self) -> f64 {
        self.content_end
    }

    pub fn current_word(&self) -> Option<&WordSegment> {
        self.state
            .current_word_index
            .and_then(|i| self.composition.word(i))
    }

    pub fn spoken_segments(&self) -> &[Segment] {
        self.composition
            .split_at_word(self.state.current_word_index)
            .0
    }

    pub fn unspoken_segments(&self) -> &[Segment] {
        self.composition
            .split_at_word(self.state.current_word_index)
            .1
    }

    /// Starts playback; restarts from the beginning after a natural end.
    pub fn play(&mut self) {
        if self.state.reached_end {
            log::info!("Restarting narration from the beginning");
            self.state.reached_end = false;
            self.state.current_time = 0.0;
            self.state.current_word_index = if self.composition.words.is_empty() {
                None
            } else {
                Some(0)
            };
            self.last_seek_at = Some(self.clock.now_ms());
            self.media.set_current_time(0.0);
            self.emit_time_update();
        }
        self.request_play();
    }

    pub fn pause(&mut self) {
        self.resume_after_seek = false;
        self.media.pause();
    }

    /// Continues from the current position, never rewinding.
    pub fn resume(&mut self) {
        self.request_play();
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seeks to `time` (clamped) and returns the position actually used.
    ///
    /// `current_time` and `current_word_index` reflect the target when this
    /// returns, before the handle confirms.
    pub fn seek_to_time(&mut self, time: f64) -> f64 {
        let target = self.clamp_seek(time);
        let word_index = locate(&self.composition.words, target);
        self.apply_seek(target, word_index)
    }

    /// Seeks to the start of the given word. `None` if there is no such word.
    pub fn seek_to_word(&mut self, index: usize) -> Option<f64> {
        let Some(start) = self.composition.word(index).map(|w| w.start_time) else {
            log::debug!("Ignoring seek to unknown word {index}");
            return None;
        };
        let target = self.clamp_seek(start);
        Some(self.apply_seek(target, Some(index)))
    }

    pub fn start_scrubbing(&mut self) {
        if self.state.is_scrubbing {
            return;
        }
        self.state.is_scrubbing = true;
        self.stop_loop();
    }

    pub fn end_scrubbing(&mut self) {
        if !self.state.is_scrubbing {
            return;
        }
        self.state.is_scrubbing = false;
        if self.state.is_playing {
            self.start_loop();
        }
    }

    /// Generation of the running loop, if any. The host runs one frame
    /// callback chain per generation.
    pub fn running_generation(&self) -> Option<u64> {
        self.loop_running.then_some(self.loop_generation)
    }

    /// One frame of the loop. Returns whether another frame should follow.
    pub fn tick(&mut self, generation: u64) -> bool {
        if !self.loop_running || generation != self.loop_generation {
            return false;
        }
        if self.state.is_scrubbing || self.media.is_paused() {
            self.stop_loop();
            return false;
        }

        let now = self.clock.now_ms();
        let media_time = self.media.current_time();
        if !self.in_seek_suppression(now) {
            self.sync_position(media_time);
        }

        if self.content_end > 0.0 && media_time >= self.content_end && !self.in_end_grace(now) {
            log::info!("Narration reached content end at {:.2}s", media_time);
            self.media.pause();
            self.state.is_playing = false;
            self.stop_loop();
            self.mark_reached_end();
            return false;
        }
        true
    }

    pub fn on_media_event(&mut self, event: MediaEvent) {
        let now = self.clock.now_ms();
        match event {
            MediaEvent::Play => {
                if !self.state.is_playing {
                    self.state.is_playing = true;
                    self.emit(PlaybackEvent::Play);
                }
                if !self.loop_running {
                    self.start_loop();
                }
            }
            MediaEvent::Pause => {
                if self.resume_after_seek && self.in_seek_suppression(now) {
                    log::debug!("Media paused while seeking; requesting playback again");
                    self.request_play();
                    return;
                }
                self.resume_after_seek = false;
                self.stop_loop();
                if self.state.is_playing {
                    self.state.is_playing = false;
                    self.emit(PlaybackEvent::Pause);
                }
                if !self.in_seek_suppression(now) && !self.state.reached_end {
                    self.sync_position(self.media.current_time());
                }
            }
            MediaEvent::Ended => {
                self.resume_after_seek = false;
                self.state.is_playing = false;
                self.stop_loop();
                if !self.state.reached_end {
                    self.mark_reached_end();
                }
            }
            MediaEvent::Seeked => {
                if self.resume_after_seek && self.media.is_paused() {
                    log::debug!("Seek settled paused; requesting playback again");
                    self.request_play();
                }
                if !self.in_seek_suppression(now) && !self.state.is_scrubbing {
                    self.sync_position(self.media.current_time());
                }
            }
            MediaEvent::TimeUpdate => {
                if !self.in_seek_suppression(now)
                    && !self.state.is_scrubbing
                    && !self.state.reached_end
                {
                    self.sync_position(self.media.current_time());
                }
            }
            MediaEvent::DurationChange => {
                let duration = self.effective_duration();
                if duration != self.state.duration {
                    self.state.duration = duration;
                    self.emit(PlaybackEvent::DurationChange(duration));
                }
            }
            MediaEvent::Waiting => {
                if !self.state.is_buffering {
                    self.state.is_buffering = true;
                    self.emit(PlaybackEvent::Buffering(true));
                }
            }
            MediaEvent::Playing => {
                if self.state.is_buffering {
                    self.state.is_buffering = false;
                    self.emit(PlaybackEvent::Buffering(false));
                }
            }
            MediaEvent::Error(err) => self.fail(err),
        }
    }

    fn request_play(&mut self) {
        if let Err(err) = self.media.play() {
            self.fail(err);
        }
    }

    fn fail(&mut self, err: MediaError) {
        log::error!("Media playback error: {err}");
        self.resume_after_seek = false;
        self.state.is_playing = false;
        if self.state.is_buffering {
            self.state.is_buffering = false;
            self.emit(PlaybackEvent::Buffering(false));
        }
        self.stop_loop();
        self.emit(PlaybackEvent::AudioError(err));
    }

    fn apply_seek(&mut self, target: f64, word_index: Option<usize>) -> f64 {
        let was_playing = self.state.is_playing;

        self.state.reached_end = false;
        self.state.current_time = target;
        self.state.current_word_index = word_index;
        self.last_seek_at = Some(self.clock.now_ms());
        self.resume_after_seek = was_playing;

        log::debug!("Seeking to {target:.3}s (word {word_index:?}, playing={was_playing})");
        self.media.set_current_time(target);
        if was_playing && self.media.is_paused() {
            self.request_play();
        }
        self.emit_time_update();
        target
    }

    /// Keeps seeks strictly below both the media duration and the content
    /// end, so a clamped seek never satisfies the natural-end check.
    fn clamp_seek(&self, time: f64) -> f64 {
        let epsilon = self.config.seek_end_epsilon_sec;
        let mut max = f64::INFINITY;
        if let Some(duration) = self.media_duration() {
            max = max.min(duration - epsilon);
        }
        if self.content_end > 0.0 {
            max = max.min(self.content_end - epsilon);
        }
        let max = max.max(0.0);
        if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, max)
        }
    }

    fn sync_position(&mut self, media_time: f64) {
        let time = if self.state.duration > 0.0 {
            media_time.clamp(0.0, self.state.duration)
        } else {
            media_time.max(0.0)
        };
        let index = locate_from(
            &self.composition.words,
            self.state.current_word_index,
            time,
            self.config.max_forward_scan,
        );
        if time == self.state.current_time && index == self.state.current_word_index {
            return;
        }
        self.state.current_time = time;
        self.state.current_word_index = index;
        self.emit_time_update();
    }

    fn mark_reached_end(&mut self) {
        self.state.reached_end = true;
        if self.state.duration > 0.0 {
            self.state.current_time = self.state.duration;
        }
        self.state.current_word_index = self.composition.words.len().checked_sub(1);
        self.emit_time_update();
        self.emit(PlaybackEvent::Ended);
    }

    fn media_duration(&self) -> Option<f64> {
        self.media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn effective_duration(&self) -> f64 {
        match (self.media_duration(), self.content_end > 0.0) {
            (Some(duration), true) => duration.min(self.content_end),
            (Some(duration), false) => duration,
            (None, true) => self.content_end,
            (None, false) => 0.0,
        }
    }

    fn in_seek_suppression(&self, now: f64) -> bool {
        self.last_seek_at
            .is_some_and(|at| now - at < self.config.seek_suppression_ms)
    }

    fn in_end_grace(&self, now: f64) -> bool {
        self.last_seek_at
            .is_some_and(|at| now - at < self.config.end_grace_ms)
    }

    fn start_loop(&mut self) {
        if self.state.is_scrubbing {
            return;
        }
        self.loop_generation += 1;
        self.loop_running = true;
    }

    fn stop_loop(&mut self) {
        self.loop_running = false;
    }

    fn emit_time_update(&mut self) {
        self.emit(PlaybackEvent::TimeUpdate {
            current_time: self.state.current_time,
            word_index: self.state.current_word_index,
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}
