use leptos::web_sys::HtmlInputElement;
use wasm_bindgen::JsCast;

pub fn input_value(ev: &leptos::ev::Event) -> String {
    ev.target()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default()
}

/// UTF-16 offset of the `char_index`-th char of `text`, clamped to its end.
pub fn utf16_offset(text: &str, char_index: usize) -> u32 {
    text.chars()
        .take(char_index)
        .map(|c| c.len_utf16() as u32)
        .sum()
}

/// `m:ss` for a position in seconds; negative and non-finite values show as 0.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
