//! Audio decode and output
//!
//! - [`decoder`]: symphonia decode of the scratch advice file to PCM
//! - [`output`]: cpal playback backend (feature `audio-output`)

pub mod decoder;
#[cfg(feature = "audio-output")]
pub mod output;

pub use decoder::{decode_file, DecodedAudio};
#[cfg(feature = "audio-output")]
pub use output::CpalBackend;
