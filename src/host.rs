//! Reads the narration inputs the host page provides.

use leptos::web_sys::{self, Document, Element};
use read_along_lib::{AlignmentError, CharacterAlignment, EngineConfig};
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Container holding the rendered article.
pub const CONTENT_SELECTOR: &str = "[data-read-along-content]";
const AUDIO_SRC_ATTR: &str = "data-audio-src";
const CONFIG_ATTR: &str = "data-read-along-config";
const LOG_LEVEL_ATTR: &str = "data-read-along-log-level";
const OVERRIDE_ATTR_PREFIX: &str = "data-read-along-";
const ALIGNMENT_SCRIPT_ID: &str = "read-along-alignment";
const ALIGNMENT_GLOBAL: &str = "__READ_ALONG_ALIGNMENT__";

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Browser document unavailable")]
    NoDocument,

    #[error("No element matches {0}")]
    MissingContainer(&'static str),

    #[error("Content container has no {0} attribute")]
    MissingAudioSource(&'static str),

    #[error("No alignment script or global on the page")]
    MissingAlignment,

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("Unreadable alignment value: {0}")]
    AlignmentValue(String),

    #[error("Audio setup failed: {0}")]
    Audio(String),

    #[error("Browser API failed: {0}")]
    Browser(String),
}

impl HostError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoDocument | Self::MissingContainer(_) => "Read-along is not available on this page.",
            Self::MissingAudioSource(_) => "This article has no narration audio.",
            Self::MissingAlignment | Self::AlignmentValue(_) => {
                "Narration timing is missing. Highlighting is unavailable."
            }
            Self::Alignment(err) => err.user_message(),
            Self::Audio(_) => "The narration audio could not be prepared.",
            Self::Browser(_) => "Read-along could not start in this browser.",
        }
    }
}

/// Everything needed to start a session.
pub struct HostPage {
    pub document: Document,
    pub content: Element,
    pub audio_src: String,
    pub alignment: CharacterAlignment,
    pub config: EngineConfig,
}

pub fn document() -> Result<Document, HostError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(HostError::NoDocument)
}

fn content_container(document: &Document) -> Result<Element, HostError> {
    document
        .query_selector(CONTENT_SELECTOR)
        .ok()
        .flatten()
        .ok_or(HostError::MissingContainer(CONTENT_SELECTOR))
}

pub fn discover() -> Result<HostPage, HostError> {
    let document = document()?;
    let content = content_container(&document)?;
    let audio_src = content
        .get_attribute(AUDIO_SRC_ATTR)
        .filter(|src| !src.trim().is_empty())
        .ok_or(HostError::MissingAudioSource(AUDIO_SRC_ATTR))?;
    let alignment = read_alignment(&document)?;
    let config = read_config(&content);

    log::info!(
        "Read-along page found: {} alignment characters, audio {}",
        alignment.len(),
        audio_src
    );
    Ok(HostPage {
        document,
        content,
        audio_src,
        alignment,
        config,
    })
}

/// Console level from the content container, `info` when unset or unknown.
pub fn log_level() -> log::LevelFilter {
    document()
        .and_then(|d| content_container(&d))
        .ok()
        .and_then(|c| c.get_attribute(LOG_LEVEL_ATTR))
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(log::LevelFilter::Info)
}

fn read_alignment(document: &Document) -> Result<CharacterAlignment, HostError> {
    if let Some(script) = document.get_element_by_id(ALIGNMENT_SCRIPT_ID) {
        let json = script.text_content().unwrap_or_default();
        return Ok(CharacterAlignment::from_json(&json)?);
    }

    let window = web_sys::window().ok_or(HostError::NoDocument)?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(ALIGNMENT_GLOBAL))
        .map_err(|err| HostError::AlignmentValue(extract_error(err)))?;
    if value.is_null() || value.is_undefined() {
        return Err(HostError::MissingAlignment);
    }
    if let Some(json) = value.as_string() {
        return Ok(CharacterAlignment::from_json(&json)?);
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| HostError::AlignmentValue(err.to_string()))
}

/// JSON from `data-read-along-config`, then per-field attributes such as
/// `data-read-along-seek-suppression-ms`.
fn read_config(content: &Element) -> EngineConfig {
    let mut config = match content.get_attribute(CONFIG_ATTR) {
        Some(json) => EngineConfig::from_json(&json).unwrap_or_else(|err| {
            log::warn!("Ignoring {CONFIG_ATTR}: {err}");
            EngineConfig::default()
        }),
        None => EngineConfig::default(),
    };
    config.apply_overrides(OVERRIDE_ATTR_PREFIX, |key| {
        content.get_attribute(&key.to_ascii_lowercase().replace('_', "-"))
    });
    config.validated()
}

pub fn extract_error(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::Reflect::get(&err, &"message".into())
                .ok()
                .and_then(|v| v.as_string())
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// The `name` of a rejected DOMException, e.g. `AbortError`.
pub fn error_name(err: &JsValue) -> Option<String> {
    js_sys::Reflect::get(err, &"name".into())
        .ok()
        .and_then(|v| v.as_string())
}
