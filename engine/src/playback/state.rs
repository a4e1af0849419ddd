use serde::Serialize;

/// Everything the UI reads about playback. Written only by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_time: f64,
    /// Capped at the content end so trailing silence is never shown.
    pub duration: f64,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub is_scrubbing: bool,
    pub current_word_index: Option<usize>,
    /// Playback stopped because the content ran out; the next `play` restarts.
    pub reached_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
    Buffering,
    Ended,
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        if self.reached_end {
            PlaybackPhase::Ended
        } else if self.is_buffering {
            PlaybackPhase::Buffering
        } else if self.is_playing {
            PlaybackPhase::Playing
        } else if self.current_time > 0.0 {
            PlaybackPhase::Paused
        } else {
            PlaybackPhase::Idle
        }
    }

    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
