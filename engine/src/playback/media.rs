//! Seams to the host's media element and wall clock.

use crate::error::MediaError;

/// A media element the controller drives. All times are in seconds.
pub trait MediaHandle {
    fn current_time(&self) -> f64;
    /// `None` while unknown (not loaded, or a live/unbounded stream).
    fn duration(&self) -> Option<f64>;
    fn is_paused(&self) -> bool;
    /// Requests playback. Asynchronous failures arrive later as
    /// [`MediaEvent::Error`].
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn set_current_time(&mut self, time: f64);
}

/// Monotonic milliseconds, used for the post-seek windows.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Lifecycle notifications from the media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
    /// A seek settled.
    Seeked,
    TimeUpdate,
    DurationChange,
    /// Stalled waiting for data.
    Waiting,
    /// Resumed after buffering.
    Playing,
    Error(MediaError),
}
