use leptos::prelude::*;
use read_along_lib::{PlaybackPhase, PlaybackState};

use crate::runtime::Runtime;
use crate::utils::{format_clock, input_value};

#[component]
pub fn PlayerBar(
    runtime: StoredValue<Option<Runtime>, LocalStorage>,
    state: ReadSignal<PlaybackState>,
    word: ReadSignal<Option<String>>,
    error: ReadSignal<Option<String>>,
) -> impl IntoView {
    let with_runtime = move |f: &dyn Fn(&Runtime)| {
        runtime.with_value(|rt| {
            if let Some(rt) = rt {
                f(rt);
            }
        })
    };

    let toggle = move |_| with_runtime(&|rt| rt.toggle());
    let scrub_start = move |_| with_runtime(&|rt| rt.start_scrubbing());
    // A tap that leaves the value unchanged fires no `change`.
    let scrub_end = move || with_runtime(&|rt| rt.end_scrubbing());
    let scrub_to = move |value: String| {
        let Ok(time) = value.parse::<f64>() else {
            return;
        };
        with_runtime(&|rt| rt.seek_to_time(time));
    };

    let available = move || runtime.with_value(Option::is_some);

    view! {
        <section class="player-bar">
            <button
                class="play-toggle"
                on:click=toggle
                disabled=move || !available()
                aria-label=move || if state.get().is_playing { "Pause narration" } else { "Play narration" }
            >
                {move || match state.get().phase() {
                    PlaybackPhase::Playing => "Pause",
                    PlaybackPhase::Buffering => "Loading...",
                    PlaybackPhase::Ended => "Replay",
                    PlaybackPhase::Paused => "Resume",
                    PlaybackPhase::Idle => "Listen",
                }}
            </button>

            <input
                class="scrubber"
                type="range"
                min="0"
                step="0.01"
                max=move || state.get().duration.to_string()
                prop:value=move || state.get().current_time.to_string()
                disabled=move || !available()
                on:pointerdown=scrub_start
                on:input=move |ev| scrub_to(input_value(&ev))
                on:change=move |_| scrub_end()
                on:pointerup=move |_| scrub_end()
                on:pointercancel=move |_| scrub_end()
                on:lostpointercapture=move |_| scrub_end()
            />

            <span class="clock">
                {move || {
                    let s = state.get();
                    format!("{} / {}", format_clock(s.current_time), format_clock(s.duration))
                }}
            </span>

            <span class="pill" class:live=move || state.get().is_playing class:idle=move || !state.get().is_playing>
                {move || word.get().unwrap_or_default()}
            </span>

            {move || error.get().map(|msg| view! { <p class="error-msg">{msg}</p> })}
        </section>
    }
}
