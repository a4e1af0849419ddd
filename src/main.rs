mod app;
mod components;
mod host;
mod logger;
mod media;
mod runtime;
mod utils;
mod web_dom;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logger::init(host::log_level());
    mount_to_body(App);
}
