mod controller;
pub mod media;
pub mod state;

pub use controller::{PlaybackController, PlaybackEvent};
pub use media::{Clock, MediaEvent, MediaHandle};
pub use state::{PlaybackPhase, PlaybackState};
