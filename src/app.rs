use leptos::prelude::*;
use read_along_lib::PlaybackState;

use crate::components::player::PlayerBar;
use crate::host;
use crate::runtime::{Runtime, ViewSignals};

#[component]
pub fn App() -> impl IntoView {
    let (state, set_state) = signal(PlaybackState::default());
    let (word, set_word) = signal::<Option<String>>(None);
    let (error, set_error) = signal::<Option<String>>(None);

    let signals = ViewSignals {
        state: set_state,
        word: set_word,
        error: set_error,
    };
    let runtime = match host::discover().and_then(|page| Runtime::start(page, signals)) {
        Ok(runtime) => Some(runtime),
        Err(err) => {
            log::error!("Read-along unavailable: {err}");
            set_error.set(Some(err.user_message().to_string()));
            None
        }
    };
    let ready = runtime.is_some();
    let runtime = StoredValue::new_local(runtime);

    view! {
        <aside class="read-along" class:disabled=!ready>
            <PlayerBar runtime state word error />
        </aside>
    }
}
