#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use read_along_lib::{
    CharacterAlignment, Clock, EngineConfig, MediaError, MediaEvent, MediaHandle,
    PlaybackController, PlaybackEvent,
};

pub struct FakeMediaState {
    pub current_time: f64,
    pub duration: Option<f64>,
    pub paused: bool,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub seeks: Vec<f64>,
    pub play_error: Option<MediaError>,
    /// Mimics engines that pause themselves while a seek is applied.
    pub pause_on_seek: bool,
}

impl Default for FakeMediaState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            paused: true,
            play_calls: 0,
            pause_calls: 0,
            seeks: Vec::new(),
            play_error: None,
            pause_on_seek: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeMedia(pub Rc<RefCell<FakeMediaState>>);

impl FakeMedia {
    pub fn with_duration(duration: f64) -> Self {
        let media = Self::default();
        media.0.borrow_mut().duration = Some(duration);
        media
    }

    pub fn set_time(&self, time: f64) {
        self.0.borrow_mut().current_time = time;
    }

    pub fn play_calls(&self) -> usize {
        self.0.borrow().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.0.borrow().pause_calls
    }

    pub fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }
}

impl MediaHandle for FakeMedia {
    fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    fn duration(&self) -> Option<f64> {
        self.0.borrow().duration
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut state = self.0.borrow_mut();
        state.play_calls += 1;
        if let Some(err) = state.play_error.clone() {
            return Err(err);
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.0.borrow_mut();
        state.pause_calls += 1;
        state.paused = true;
    }

    fn set_current_time(&mut self, time: f64) {
        let mut state = self.0.borrow_mut();
        state.seeks.push(time);
        state.current_time = time;
        if state.pause_on_seek {
            state.paused = true;
        }
    }
}

#[derive(Clone, Default)]
pub struct ManualClock(pub Rc<Cell<f64>>);

impl ManualClock {
    pub fn advance(&self, ms: f64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

/// `"hi you"` with the timings used throughout the docs.
pub fn hi_you() -> CharacterAlignment {
    CharacterAlignment::new(
        vec!['h', 'i', ' ', 'y', 'o', 'u'],
        vec![0.0, 0.1, 0.2, 0.2, 0.3, 0.4],
        vec![0.1, 0.2, 0.2, 0.3, 0.4, 0.5],
    )
}

/// One char every 0.1s; whitespace gets a zero-length slot.
pub fn uniform(text: &str) -> CharacterAlignment {
    let mut times = Vec::new();
    let mut t = 0.0;
    for c in text.chars() {
        if c.is_whitespace() {
            times.push((t, t));
        } else {
            times.push((t, t + 0.1));
            t += 0.1;
        }
    }
    CharacterAlignment::from_text(text, &times)
}

pub type Controller = PlaybackController<FakeMedia, ManualClock>;

pub fn controller_for(
    alignment: CharacterAlignment,
    media: &FakeMedia,
    clock: &ManualClock,
) -> Controller {
    let config = EngineConfig::default();
    let mut controller =
        PlaybackController::new(media.clone(), clock.clone(), config.playback, config.compose);
    controller.set_alignment(Rc::new(alignment));
    controller
}

pub fn record_events(controller: &mut Controller) -> Rc<RefCell<Vec<PlaybackEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    controller.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// `play()` plus the handle's `play` notification.
pub fn start_playing(controller: &mut Controller) {
    controller.play();
    controller.on_media_event(MediaEvent::Play);
}
