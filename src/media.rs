//! `HtmlAudioElement` behind the engine's media seam.

use std::rc::Rc;

use leptos::task::spawn_local;
use leptos::web_sys::{self, HtmlAudioElement, Performance};
use read_along_lib::{Clock, MediaError, MediaEvent, MediaHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::host::{error_name, extract_error};

const MEDIA_EVENTS: [&str; 10] = [
    "play",
    "pause",
    "ended",
    "seeked",
    "timeupdate",
    "durationchange",
    "loadedmetadata",
    "waiting",
    "playing",
    "error",
];

/// Receives asynchronous `play()` rejections.
pub type ErrorSink = Rc<dyn Fn(MediaError)>;

pub struct AudioElementHandle {
    audio: HtmlAudioElement,
    on_play_rejected: ErrorSink,
}

impl AudioElementHandle {
    pub fn new(audio: HtmlAudioElement, on_play_rejected: ErrorSink) -> Self {
        Self {
            audio,
            on_play_rejected,
        }
    }
}

impl MediaHandle for AudioElementHandle {
    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.audio.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    fn is_paused(&self) -> bool {
        self.audio.paused()
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let promise = self
            .audio
            .play()
            .map_err(|err| MediaError::new(None, extract_error(err)))?;

        let sink = Rc::clone(&self.on_play_rejected);
        spawn_local(async move {
            let Err(err) = JsFuture::from(promise).await else {
                return;
            };
            // Superseded by a later pause() or source change.
            if error_name(&err).as_deref() == Some("AbortError") {
                log::debug!("play() aborted: {}", extract_error(err));
                return;
            }
            sink(MediaError::new(None, extract_error(err)));
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(err) = self.audio.pause() {
            log::warn!("pause() failed: {}", extract_error(err));
        }
    }

    fn set_current_time(&mut self, time: f64) {
        self.audio.set_current_time(time);
    }
}

/// `performance.now()`, falling back to `Date.now()`.
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|w| w.performance()),
        }
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance
            .as_ref()
            .map_or_else(js_sys::Date::now, |p| p.now())
    }
}

/// Forwards the audio element's lifecycle events as [`MediaEvent`]s.
pub fn listen_media_events<F>(audio: &HtmlAudioElement, dispatch: F)
where
    F: Fn(MediaEvent) + Clone + 'static,
{
    for name in MEDIA_EVENTS {
        let element = audio.clone();
        let dispatch = dispatch.clone();
        let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            if let Some(event) = translate(name, &element) {
                dispatch(event);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        if let Err(err) =
            audio.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
        {
            log::error!("Could not listen for {name}: {}", extract_error(err));
        }
        callback.forget();
    }
}

fn translate(name: &str, audio: &HtmlAudioElement) -> Option<MediaEvent> {
    let event = match name {
        "play" => MediaEvent::Play,
        "pause" => MediaEvent::Pause,
        "ended" => MediaEvent::Ended,
        "seeked" => MediaEvent::Seeked,
        "timeupdate" => MediaEvent::TimeUpdate,
        "durationchange" | "loadedmetadata" => MediaEvent::DurationChange,
        "waiting" => MediaEvent::Waiting,
        "playing" => MediaEvent::Playing,
        "error" => MediaEvent::Error(native_error(audio)),
        _ => return None,
    };
    Some(event)
}

fn native_error(audio: &HtmlAudioElement) -> MediaError {
    match audio.error() {
        Some(err) => {
            let message = err.message();
            let message = if message.is_empty() {
                "Media element error".to_string()
            } else {
                message
            };
            MediaError::new(Some(err.code()), message)
        }
        None => MediaError::new(None, "Media element error"),
    }
}
