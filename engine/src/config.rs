use serde::{Deserialize, Serialize};

use crate::error::ReadAlongError;
use crate::segments::locator::DEFAULT_MAX_FORWARD_SCAN;
use crate::segments::ComposeOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Position reports from the handle are ignored this long after a seek.
    pub seek_suppression_ms: f64,
    /// Natural-end auto-pause is held off this long after a seek.
    pub end_grace_ms: f64,
    /// Seeks clamp to this far below both media duration and content end.
    pub seek_end_epsilon_sec: f64,
    pub max_forward_scan: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seek_suppression_ms: 120.0,
            end_grace_ms: 1500.0,
            seek_end_epsilon_sec: 0.1,
            max_forward_scan: DEFAULT_MAX_FORWARD_SCAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub mutation_debounce_ms: f64,
    pub click_resume_delay_ms: f64,
    /// DOM tokens searched ahead for each word before it is left unmarked.
    pub match_lookahead: usize,
    pub scroll_margin_px: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            mutation_debounce_ms: 150.0,
            click_resume_delay_ms: 60.0,
            match_lookahead: 6,
            scroll_margin_px: 48.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub playback: PlaybackConfig,
    pub highlight: HighlightConfig,
    pub compose: ComposeOptions,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ReadAlongError> {
        serde_json::from_str::<Self>(json)
            .map(Self::validated)
            .map_err(|e| ReadAlongError::Config(e.to_string()))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides("READ_ALONG_", |key| std::env::var(key).ok());
        config.validated()
    }

    /// Overrides fields from `lookup(prefix + KEY)`; unparsable values are skipped.
    pub fn apply_overrides<F>(&mut self, prefix: &str, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |suffix: &str| lookup(&format!("{prefix}{suffix}"));
        let apply_f64 = |suffix: &str, target: &mut f64| {
            if let Some(v) = value(suffix).and_then(|s| s.trim().parse::<f64>().ok()) {
                if v.is_finite() && v >= 0.0 {
                    *target = v;
                }
            }
        };
        let apply_usize = |suffix: &str, target: &mut usize| {
            if let Some(v) = value(suffix).and_then(|s| s.trim().parse().ok()) {
                *target = v;
            }
        };

        apply_f64("SEEK_SUPPRESSION_MS", &mut self.playback.seek_suppression_ms);
        apply_f64("END_GRACE_MS", &mut self.playback.end_grace_ms);
        apply_f64("SEEK_END_EPSILON_SEC", &mut self.playback.seek_end_epsilon_sec);
        apply_usize("MAX_FORWARD_SCAN", &mut self.playback.max_forward_scan);
        apply_f64("MUTATION_DEBOUNCE_MS", &mut self.highlight.mutation_debounce_ms);
        apply_f64("CLICK_RESUME_DELAY_MS", &mut self.highlight.click_resume_delay_ms);
        apply_usize("MATCH_LOOKAHEAD", &mut self.highlight.match_lookahead);
        apply_f64("SCROLL_MARGIN_PX", &mut self.highlight.scroll_margin_px);

        if let Some(v) = value("HIDE_TAGS") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.compose.hide_tags = true,
                "0" | "false" | "no" | "off" => self.compose.hide_tags = false,
                other => log::warn!("Ignoring {prefix}HIDE_TAGS={other:?}"),
            }
        }
    }

    /// The end grace must outlast the seek-suppression window.
    pub fn validated(mut self) -> Self {
        if self.playback.end_grace_ms < self.playback.seek_suppression_ms {
            log::warn!(
                "end_grace_ms ({}) shorter than seek_suppression_ms ({}); raising it",
                self.playback.end_grace_ms,
                self.playback.seek_suppression_ms
            );
            self.playback.end_grace_ms = self.playback.seek_suppression_ms;
        }
        self
    }
}
