// Audio export module
// Writes a SampleBuffer to WAV (16/24-bit PCM or 32-bit float) without resampling

use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::SampleBuffer;

/// Bit depth used when the caller does not ask for one
pub const DEFAULT_BIT_DEPTH: u16 = 24;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not create output file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not create WAV writer: {0}")]
    CreateWriter(#[source] hound::Error),

    #[error("Failed to write audio: {0}")]
    Write(#[source] hound::Error),

    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    #[error("Cannot export audio with no channels")]
    NoChannels,

    #[error("Too many channels for WAV: {0}")]
    TooManyChannels(usize),
}

fn wav_spec(channels: usize, sample_rate: u32, bit_depth: u16) -> Result<WavSpec, ExportError> {
    let sample_format = match bit_depth {
        16 | 24 => SampleFormat::Int,
        32 => SampleFormat::Float,
        other => return Err(ExportError::UnsupportedBitDepth(other)),
    };

    if channels == 0 {
        return Err(ExportError::NoChannels);
    }
    let channels = u16::try_from(channels).map_err(|_| ExportError::TooManyChannels(channels))?;

    Ok(WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bit_depth,
        sample_format,
    })
}

fn write_samples<W: Write + Seek>(
    writer: W,
    buffer: &SampleBuffer,
    spec: WavSpec,
) -> Result<(), ExportError> {
    let mut wav = WavWriter::new(writer, spec).map_err(ExportError::CreateWriter)?;

    let interleaved = buffer.to_interleaved();

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => {
            for &s in &interleaved {
                wav.write_sample(s).map_err(ExportError::Write)?;
            }
        }
        (SampleFormat::Int, bits) => {
            // Full-scale positive value for the target depth
            let scale = ((1i64 << (bits - 1)) - 1) as f32;
            for &s in &interleaved {
                let raw = (s.clamp(-1.0, 1.0) * scale).round() as i32;
                wav.write_sample(raw).map_err(ExportError::Write)?;
            }
        }
    }

    wav.finalize().map_err(ExportError::Write)
}

/// Encode a buffer as WAV bytes
pub fn encode_wav(
    buffer: &SampleBuffer,
    sample_rate: u32,
    bit_depth: u16,
) -> Result<Vec<u8>, ExportError> {
    let spec = wav_spec(buffer.num_channels(), sample_rate, bit_depth)?;
    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, buffer, spec)?;
    Ok(cursor.into_inner())
}

/// Write a buffer to a WAV file, replacing any existing file at `path`
pub fn save_wav(
    path: &Path,
    buffer: &SampleBuffer,
    sample_rate: u32,
    bit_depth: u16,
) -> Result<(), ExportError> {
    let spec = wav_spec(buffer.num_channels(), sample_rate, bit_depth)?;

    if path.exists() {
        fs::remove_file(path).map_err(|source| ExportError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| ExportError::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;

    write_samples(BufWriter::new(file), buffer, spec)?;

    log::info!(
        "Wrote {}: {} frames, {} channels, {} bit",
        path.display(),
        buffer.num_samples(),
        buffer.num_channels(),
        bit_depth
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ingest_wav, load_audio_file};
    use tempfile::TempDir;

    fn stereo_ramp(frames: usize) -> SampleBuffer {
        let left: Vec<f32> = (0..frames).map(|i| i as f32 / frames as f32 - 0.5).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        SampleBuffer::new(vec![left, right]).unwrap()
    }

    #[test]
    fn test_encode_24bit_preserves_shape() {
        let buffer = stereo_ramp(1000);
        let bytes = encode_wav(&buffer, 48000, 24).unwrap();
        let decoded = ingest_wav(&bytes).unwrap();

        assert_eq!(decoded.sample_rate, 48000);
        assert_eq!(decoded.bit_depth, 24);
        assert_eq!(decoded.buffer.num_channels(), 2);
        assert_eq!(decoded.frame_count(), 1000);

        for ch in 0..2 {
            for (a, b) in decoded
                .buffer
                .channel(ch)
                .iter()
                .zip(buffer.channel(ch).iter())
            {
                assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_encode_float_is_exact() {
        let buffer = SampleBuffer::from_mono(vec![0.1, -0.2, 0.3, 1.5]);
        let bytes = encode_wav(&buffer, 44100, 32).unwrap();
        let decoded = ingest_wav(&bytes).unwrap();

        // Float output is not clamped
        assert_eq!(decoded.buffer.channel(0), buffer.channel(0));
    }

    #[test]
    fn test_encode_16bit_clamps() {
        let buffer = SampleBuffer::from_mono(vec![2.0, -2.0]);
        let bytes = encode_wav(&buffer, 44100, 16).unwrap();
        let decoded = ingest_wav(&bytes).unwrap();

        assert!((decoded.buffer.channel(0)[0] - 1.0).abs() < 1e-3);
        assert!((decoded.buffer.channel(0)[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_unsupported_bit_depth() {
        let buffer = SampleBuffer::from_mono(vec![0.0; 4]);
        let result = encode_wav(&buffer, 44100, 12);
        assert!(matches!(result, Err(ExportError::UnsupportedBitDepth(12))));
    }

    #[test]
    fn test_too_many_channels() {
        let buffer = SampleBuffer::new(vec![Vec::new(); 70000]).unwrap();
        let result = encode_wav(&buffer, 44100, 24);
        assert!(matches!(result, Err(ExportError::TooManyChannels(70000))));
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.wav");
        fs::write(&path, b"stale contents").unwrap();

        let buffer = stereo_ramp(256);
        save_wav(&path, &buffer, 44100, DEFAULT_BIT_DEPTH).unwrap();

        let loaded = load_audio_file(&path).unwrap();
        assert_eq!(loaded.frame_count(), 256);
        assert_eq!(loaded.buffer.num_channels(), 2);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.wav");
        let buffer = SampleBuffer::from_mono(vec![0.0; 8]);

        let result = save_wav(&path, &buffer, 44100, 24);
        assert!(matches!(result, Err(ExportError::CreateFile { .. })));
    }
}
