use thiserror::Error;

use crate::alignment::AlignmentError;

/// Unified engine errors.
#[derive(Error, Debug)]
pub enum ReadAlongError {
    #[error("Alignment: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("Media: {0}")]
    Media(#[from] MediaError),

    #[error("Config: {0}")]
    Config(String),
}

impl ReadAlongError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Alignment(err) => err.user_message(),
            Self::Media(err) => err.user_message(),
            Self::Config(_) => "The narration settings are invalid. Defaults will be used.",
        }
    }
}

impl serde::Serialize for ReadAlongError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Coarse classification of the native media error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
    Unknown,
}

/// Playback failure reported by the media handle, carrying its native detail.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (code {code:?})")]
pub struct MediaError {
    pub code: Option<u16>,
    pub message: String,
}

impl MediaError {
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> MediaErrorKind {
        match self.code {
            Some(1) => MediaErrorKind::Aborted,
            Some(2) => MediaErrorKind::Network,
            Some(3) => MediaErrorKind::Decode,
            Some(4) => MediaErrorKind::SourceNotSupported,
            _ => MediaErrorKind::Unknown,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            MediaErrorKind::Aborted => "Playback was interrupted.",
            MediaErrorKind::Network => "The narration audio could not be loaded. Check your connection.",
            MediaErrorKind::Decode => "The narration audio is damaged and cannot be played.",
            MediaErrorKind::SourceNotSupported => "This narration audio format is not supported.",
            MediaErrorKind::Unknown => "The narration audio could not be played.",
        }
    }
}
