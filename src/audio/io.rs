//! Audio file decoding
//!
//! Every input ends up as a mono 32-bit float buffer at the analysis rate.
//! WAV files are read with hound; everything else (MP3, FLAC, Vorbis, AAC,
//! ...) goes through symphonia's probe. Channels are averaged, then the
//! result is resampled with linear interpolation.

use std::fs::File;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::{debug, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::buffer::MonoBuffer;
use crate::error::{Result, TrackscanError};

/// Decode an audio file and convert it to a mono buffer at `target_rate`
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If no decoder accepts the file
/// * `EmptyAudio` - If the file decodes to zero samples
pub fn load_mono(path: &Path, target_rate: u32) -> Result<MonoBuffer> {
    let decoded = decode_file(path)?;

    if decoded.is_empty() {
        return Err(TrackscanError::EmptyAudio);
    }

    if decoded.sample_rate == target_rate {
        return Ok(decoded);
    }

    debug!(
        "Resampling {} from {} Hz to {} Hz",
        path.display(),
        decoded.sample_rate,
        target_rate
    );
    let ratio = target_rate as f64 / decoded.sample_rate as f64;
    Ok(MonoBuffer::new(
        resample_linear(&decoded.samples, ratio),
        target_rate,
    ))
}

/// Decode an audio file to mono at its native sample rate
pub fn decode_file(path: &Path) -> Result<MonoBuffer> {
    if !path.exists() {
        return Err(TrackscanError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    if is_wav(path) {
        match decode_wav(path) {
            Ok(buffer) => return Ok(buffer),
            // hound only handles PCM and IEEE float; let symphonia try the rest
            Err(e) => debug!("WAV reader rejected {}: {}", path.display(), e),
        }
    }

    decode_with_symphonia(path)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"))
        .unwrap_or(false)
}

/// Read a WAV file with hound
fn decode_wav(path: &Path) -> Result<MonoBuffer> {
    let reader = WavReader::open(path).map_err(|e| TrackscanError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(TrackscanError::UnsupportedFormat {
            format: "WAV file with zero channels".to_string(),
        });
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    debug!(
        "Decoded WAV {}: {} Hz, {} channels, {} samples",
        path.display(),
        spec.sample_rate,
        channels,
        interleaved.len()
    );

    Ok(MonoBuffer::new(
        downmix(&interleaved, channels),
        spec.sample_rate,
    ))
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let scale = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => {
            return reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| TrackscanError::InvalidAudio {
                    reason: format!("Failed to read float samples: {}", e),
                    source: Some(Box::new(e)),
                });
        }
        (SampleFormat::Int, 8) => 128.0,
        (SampleFormat::Int, 16) => 32768.0,
        (SampleFormat::Int, 24) => 8388608.0,
        (SampleFormat::Int, 32) => 2147483648.0,
        (SampleFormat::Int, bits) => {
            return Err(TrackscanError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            })
        }
    };

    // hound widens every integer depth into i32
    reader
        .samples::<i32>()
        .map(|s| s.map(|v| (v as f64 / scale) as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| TrackscanError::InvalidAudio {
            reason: format!("Failed to read {}-bit samples: {}", bits_per_sample, e),
            source: Some(Box::new(e)),
        })
}

/// Decode any format symphonia can probe
fn decode_with_symphonia(path: &Path) -> Result<MonoBuffer> {
    let file = File::open(path).map_err(|e| TrackscanError::FileNotFound {
        path: path.display().to_string(),
        source: Some(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| invalid_audio("Failed to probe format", e))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TrackscanError::InvalidAudio {
            reason: "No audio track found".to_string(),
            source: None,
        })?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| TrackscanError::UnsupportedFormat {
            format: format!("{}: {}", path.display(), e),
        })?;

    let mut sample_rate = codec_params.sample_rate;
    let mut mono = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(invalid_audio("Failed to read packet", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                let channels = spec.channels.count();

                let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                samples.copy_interleaved_ref(decoded);
                mono.extend(downmix(samples.samples(), channels));
            }
            // Corrupt frames are skipped, the rest of the stream is still usable
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!("Skipping undecodable packet in {}: {}", path.display(), msg);
            }
            Err(e) => return Err(invalid_audio("Decode error", e)),
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| TrackscanError::InvalidAudio {
        reason: "Sample rate not found".to_string(),
        source: None,
    })?;

    debug!(
        "Decoded {}: {} Hz, {} mono samples",
        path.display(),
        sample_rate,
        mono.len()
    );

    Ok(MonoBuffer::new(mono, sample_rate))
}

fn invalid_audio(context: &str, e: SymphoniaError) -> TrackscanError {
    TrackscanError::InvalidAudio {
        reason: format!("{}: {}", context, e),
        source: Some(Box::new(e)),
    }
}

/// Average interleaved frames `[L,R,L,R,...]` down to one channel
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear interpolation resampling by `ratio` (target rate / source rate)
pub fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        // Map output index to source position
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < source_len {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < source_len {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[Vec<i16>]) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_downmix_stereo() {
        let mixed = downmix(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mixed, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        assert_eq!(downmix(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }

    #[test]
    fn test_resample_linear_upsample() {
        let resampled = resample_linear(&[0.0, 1.0, 0.0], 2.0);
        assert_eq!(resampled.len(), 6);
        assert!((resampled[1] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        assert_eq!(resample_linear(&samples, 0.5).len(), 4);
    }

    #[test]
    fn test_decode_stereo_wav_to_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(
            &path,
            2,
            44100,
            &[vec![16384, 0], vec![-16384, -16384], vec![0, 32767]],
        );

        let buffer = decode_file(&path).unwrap();
        assert_eq!(buffer.sample_rate, 44100);
        assert_eq!(buffer.len(), 3);
        assert!((buffer.samples[0] - 0.25).abs() < 1e-4);
        assert!((buffer.samples[1] + 0.5).abs() < 1e-4);
        assert!((buffer.samples[2] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_load_mono_resamples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("low_rate.wav");
        let frames: Vec<Vec<i16>> = (0..22050).map(|_| vec![1000]).collect();
        write_wav(&path, 1, 22050, &frames);

        let buffer = load_mono(&path, 44100).unwrap();
        assert_eq!(buffer.sample_rate, 44100);
        assert_eq!(buffer.len(), 44100);
    }

    #[test]
    fn test_load_empty_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, 1, 44100, &[]);

        let err = load_mono(&path, 44100).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_AUDIO");
    }

    #[test]
    fn test_import_nonexistent_file() {
        match decode_file(Path::new("/nonexistent/path/audio.wav")).unwrap_err() {
            TrackscanError::FileNotFound { path, .. } => assert!(path.contains("nonexistent")),
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_file_is_invalid_audio() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio data").unwrap();

        let err = decode_file(&path).unwrap_err();
        assert!(matches!(
            err,
            TrackscanError::InvalidAudio { .. } | TrackscanError::UnsupportedFormat { .. }
        ));
    }
}
