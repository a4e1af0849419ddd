pub mod alignment;
pub mod config;
pub mod error;
pub mod highlight;
pub mod playback;
pub mod segments;
pub mod session;

pub use alignment::{AlignmentError, CharacterAlignment};
pub use config::{EngineConfig, HighlightConfig, PlaybackConfig};
pub use error::{MediaError, MediaErrorKind, ReadAlongError};
pub use playback::{
    Clock, MediaEvent, MediaHandle, PlaybackController, PlaybackEvent, PlaybackPhase,
    PlaybackState,
};
pub use segments::{compose, locate, ComposeOptions, Composition, Segment, WordSegment};
pub use session::ReadAlongSession;
