// Consonant Cutter - Transient shortening for vocal recordings
// Module declarations and the public engine surface

pub mod audio;
pub mod cli;
pub mod config;
pub mod events;
pub mod pipeline;
pub mod render;
pub mod units;

pub use audio::{load_audio_file, save_wav, AudioData, SampleBuffer};
pub use config::CutterParams;
pub use events::Event;
pub use pipeline::{process, ProcessError, ProcessOutput};
