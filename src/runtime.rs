//! Drives a read-along session from browser callbacks.
//!
//! All entry points go through [`Runtime::with`], which afterwards publishes
//! state to the view and reschedules the frame loop, the pending timer and
//! scroll-follow.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use leptos::web_sys::{
    self, Element, HtmlAudioElement, MutationObserver, MutationObserverInit, Node,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};
use read_along_lib::highlight::scroll::{needs_scroll, Rect};
use read_along_lib::{
    CharacterAlignment, MediaError, MediaEvent, PlaybackEvent, PlaybackState, ReadAlongSession,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::host::{extract_error, HostError, HostPage};
use crate::media::{listen_media_events, AudioElementHandle, PerformanceClock};
use crate::web_dom::{client_rect, WebDom};

type Session = ReadAlongSession<AudioElementHandle, PerformanceClock, WebDom>;

const SCROLL_CONTAINERS: [&str; 2] = [
    "[data-read-along-scroll=\"desktop\"]",
    "[data-read-along-scroll=\"mobile\"]",
];

/// Where the runtime publishes what the view shows.
#[derive(Clone, Copy)]
pub struct ViewSignals {
    pub state: WriteSignal<PlaybackState>,
    pub word: WriteSignal<Option<String>>,
    pub error: WriteSignal<Option<String>>,
}

struct Shared {
    session: RefCell<Session>,
    signals: ViewSignals,
    content: Element,
    observer: RefCell<Option<MutationObserver>>,
    published: Cell<Option<PlaybackState>>,
    frame_generation: Cell<Option<u64>>,
    timer_deadline: Cell<Option<f64>>,
    followed_word: Cell<Option<usize>>,
    scroll_margin: f64,
}

#[derive(Clone)]
pub struct Runtime {
    shared: Rc<Shared>,
}

impl Runtime {
    pub fn start(page: HostPage, signals: ViewSignals) -> Result<Self, HostError> {
        let audio = HtmlAudioElement::new_with_src(&page.audio_src)
            .map_err(|err| HostError::Audio(extract_error(err)))?;
        audio.set_preload("auto");
        let scroll_margin = page.config.highlight.scroll_margin_px;
        let document = page.document.clone();
        let content = page.content.clone();
        let config = page.config;

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let on_play_rejected = Rc::new(move |err: MediaError| {
                if let Some(shared) = weak.upgrade() {
                    Runtime { shared }.dispatch(MediaEvent::Error(err));
                }
            });
            let media = AudioElementHandle::new(audio.clone(), on_play_rejected);
            let session =
                ReadAlongSession::new(media, PerformanceClock::new(), WebDom::new(document), config);
            Shared {
                session: RefCell::new(session),
                signals,
                content,
                observer: RefCell::new(None),
                published: Cell::new(None),
                frame_generation: Cell::new(None),
                timer_deadline: Cell::new(None),
                followed_word: Cell::new(None),
                scroll_margin,
            }
        });

        let runtime = Self { shared };
        runtime.install(&audio, page.alignment)?;
        Ok(runtime)
    }

    fn install(&self, audio: &HtmlAudioElement, alignment: CharacterAlignment) -> Result<(), HostError> {
        let signals = self.shared.signals;
        let root: Node = self.shared.content.clone().into();
        {
            let mut session = self.shared.session.borrow_mut();
            session.controller_mut().subscribe(move |event| match event {
                PlaybackEvent::AudioError(err) => {
                    signals.error.set(Some(err.user_message().to_string()));
                }
                PlaybackEvent::Play => signals.error.set(None),
                _ => {}
            });
            session.set_alignment(Rc::new(alignment));
            session.activate_highlighting(root);
        }

        let runtime = self.clone();
        listen_media_events(audio, move |event| runtime.dispatch(event));
        self.observe_content()?;
        self.listen_for_clicks()?;
        self.with(|_| ());
        Ok(())
    }

    pub fn dispatch(&self, event: MediaEvent) {
        self.with(|session| session.on_media_event(event));
    }

    pub fn toggle(&self) {
        self.with(Session::toggle);
    }

    pub fn seek_to_time(&self, time: f64) {
        self.with(|session| session.seek_to_time(time));
    }

    pub fn start_scrubbing(&self) {
        self.with(Session::start_scrubbing);
    }

    pub fn end_scrubbing(&self) {
        self.with(Session::end_scrubbing);
    }

    fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let (result, rebuilt) = {
            let Ok(mut session) = self.shared.session.try_borrow_mut() else {
                log::warn!("Session busy; dropping reentrant call");
                return None;
            };
            let builds = session.highlighter().build_count();
            let result = f(&mut session);
            (result, session.highlighter().build_count() != builds)
        };

        if rebuilt {
            self.discard_own_mutations();
        }
        self.publish();
        self.schedule_frame();
        self.schedule_timer();
        self.follow_current_word();
        Some(result)
    }

    fn publish(&self) {
        let (state, word) = {
            let session = self.shared.session.borrow();
            let word = session.controller().current_word().map(|w| w.text.clone());
            (*session.state(), word)
        };
        let previous = self.shared.published.replace(Some(state));
        if previous == Some(state) {
            return;
        }
        self.shared.signals.state.set(state);
        if previous.map(|p| p.current_word_index) != Some(state.current_word_index) {
            self.shared.signals.word.set(word);
        }
    }

    // ── Frame loop ─────────────────────────────────────────────────────────

    fn schedule_frame(&self) {
        let running = self.shared.session.borrow().running_generation();
        let Some(generation) = running else {
            self.shared.frame_generation.set(None);
            return;
        };
        if self.shared.frame_generation.get() == Some(generation) {
            return;
        }
        self.shared.frame_generation.set(Some(generation));
        self.request_frame(generation);
    }

    fn request_frame(&self, generation: u64) {
        let runtime = self.clone();
        let callback = Closure::once_into_js(move || runtime.frame(generation));
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {}", extract_error(err));
            }
        }
    }

    fn frame(&self, generation: u64) {
        if self.shared.frame_generation.get() != Some(generation) {
            return;
        }
        if self.with(|session| session.tick(generation)).unwrap_or(false) {
            self.request_frame(generation);
        }
    }

    // ── Timers ─────────────────────────────────────────────────────────────

    fn schedule_timer(&self) {
        let (deadline, now) = {
            let session = self.shared.session.borrow();
            (session.next_deadline(), session.controller().now_ms())
        };
        let Some(deadline) = deadline else {
            return;
        };
        if self
            .shared
            .timer_deadline
            .get()
            .is_some_and(|pending| pending <= deadline)
        {
            return;
        }
        self.shared.timer_deadline.set(Some(deadline));

        let runtime = self.clone();
        let callback = Closure::once_into_js(move || {
            runtime.shared.timer_deadline.set(None);
            runtime.with(Session::poll_timers);
        });
        let delay = (deadline - now).max(0.0).ceil() as i32;
        if let Some(window) = web_sys::window() {
            if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay,
            ) {
                log::error!("setTimeout failed: {}", extract_error(err));
            }
        }
    }

    // ── Document hooks ─────────────────────────────────────────────────────

    fn observe_content(&self) -> Result<(), HostError> {
        let runtime = self.clone();
        let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
            runtime.with(Session::on_dom_mutation);
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|err| HostError::Browser(extract_error(err)))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_character_data(true);
        observer
            .observe_with_options(&self.shared.content, &init)
            .map_err(|err| HostError::Browser(extract_error(err)))?;

        *self.shared.observer.borrow_mut() = Some(observer);
        callback.forget();
        Ok(())
    }

    /// Records from our own marker writes are queued like any other change.
    fn discard_own_mutations(&self) {
        if let Some(observer) = self.shared.observer.borrow().as_ref() {
            observer.take_records();
        }
    }

    fn listen_for_clicks(&self) -> Result<(), HostError> {
        let runtime = self.clone();
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
                return;
            };
            runtime.with(|session| session.on_click(&target));
        }) as Box<dyn FnMut(web_sys::Event)>);

        self.shared
            .content
            .add_event_listener_with_callback_and_bool("click", callback.as_ref().unchecked_ref(), true)
            .map_err(|err| HostError::Browser(extract_error(err)))?;
        callback.forget();
        Ok(())
    }

    // ── Scroll-follow ──────────────────────────────────────────────────────

    fn follow_current_word(&self) {
        let marker = {
            let session = self.shared.session.borrow();
            let state = session.state();
            if !state.is_playing || state.is_scrubbing {
                return;
            }
            if self.shared.followed_word.replace(state.current_word_index) == state.current_word_index {
                return;
            }
            session
                .current_marker()
                .and_then(|node| node.dyn_ref::<Element>())
                .cloned()
        };
        let Some(marker) = marker else {
            return;
        };
        let Some(word) = client_rect(&marker) else {
            return;
        };

        if needs_scroll(word, scroll_viewport(), self.shared.scroll_margin) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Center);
            marker.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}

/// Visible area of the first rendered scroll container, or the window.
fn scroll_viewport() -> Rect {
    let window = web_sys::window();
    let container = window
        .as_ref()
        .and_then(|w| w.document())
        .and_then(|document| {
            SCROLL_CONTAINERS.iter().find_map(|selector| {
                document
                    .query_selector(selector)
                    .ok()
                    .flatten()
                    .filter(|element| element.client_height() > 0)
            })
        });

    match container {
        Some(element) => {
            let rect = element.get_bounding_client_rect();
            Rect::new(rect.top(), rect.bottom())
        }
        None => {
            let height = window
                .and_then(|w| w.inner_height().ok())
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0);
            Rect::new(0.0, height)
        }
    }
}
