// Audio processing module
// Handles WAV ingestion and export and the multichannel sample buffer

pub mod buffer;
pub mod export;
pub mod ingest;

pub use buffer::SampleBuffer;
pub use export::{encode_wav, save_wav, ExportError, DEFAULT_BIT_DEPTH};
pub use ingest::{ingest_wav, load_audio_file, AudioData, AudioError};
