//! Audio decoding via symphonia
//!
//! Any supported container is reduced to mono f32 at the analysis rate.
//! Channels are averaged during decode, and rate conversion goes through
//! rubato's FFT resampler so the log-frequency spectra downstream see
//! band-limited content.

use crate::error::{HarmixError, Result};
use crate::types::AudioBuffer;
use rubato::{FftFixedInOut, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Input block size fed to the resampler
const RESAMPLE_CHUNK: usize = 1024;

/// Decode an audio file to a mono buffer at `target_rate` Hz
pub fn decode(path: &Path, target_rate: u32) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(HarmixError::FileNotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| HarmixError::decode_error(path, format!("Failed to open file: {}", e)))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| HarmixError::decode_error(path, format!("Failed to probe format: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| HarmixError::decode_error(path, "No audio tracks found"))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let source_rate = codec_params.sample_rate.unwrap_or(target_rate);
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(2);
    debug!(
        "Decoding {} ({} Hz, {} ch)",
        path.display(),
        source_rate,
        channels
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| {
            HarmixError::decode_error(path, format!("Failed to create decoder: {}", e))
        })?;

    let mut mono: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(HarmixError::decode_error(
                    path,
                    format!("Failed to read packet: {}", e),
                ));
            }
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                downmix_into(&mut mono, buf.samples(), channels);
            }
            // A corrupt frame loses a few milliseconds of a multi-minute
            // track; keep going.
            Err(SymphoniaError::DecodeError(e)) => trace!("Skipping corrupt frame: {}", e),
            Err(e) => {
                return Err(HarmixError::decode_error(path, format!("Decode error: {}", e)));
            }
        }
    }

    if mono.is_empty() {
        return Err(HarmixError::decode_error(path, "No audio samples decoded"));
    }

    let samples = if source_rate == target_rate {
        mono
    } else {
        resample(&mono, source_rate, target_rate)
            .map_err(|reason| HarmixError::decode_error(path, reason))?
    };

    let buffer = AudioBuffer::new(samples, target_rate);
    debug!("Decoded {} samples ({:.2}s)", buffer.len(), buffer.duration);
    Ok(buffer)
}

/// Extract a centered excerpt spanning `kept_fraction` of the signal
///
/// The excerpt covers `[mid - f/2*len, mid + f/2*len)`; a fraction of 1.0
/// returns the whole signal.
pub fn centered_excerpt(samples: &[f32], kept_fraction: f64) -> &[f32] {
    let len = samples.len();
    let half = (len as f64 * kept_fraction / 2.0) as usize;
    let mid = len / 2;
    &samples[mid.saturating_sub(half)..(mid + half).min(len)]
}

/// Append the channel-averaged view of an interleaved block
fn downmix_into(mono: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    if channels <= 1 {
        mono.extend_from_slice(interleaved);
        return;
    }
    mono.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// FFT-based rate conversion of a mono signal
///
/// The tail is zero-padded to a whole chunk; output is trimmed back to the
/// expected length so padding never leaks into the excerpt.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> std::result::Result<Vec<f32>, String> {
    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 1)
            .map_err(|e| format!("Resampler init failed ({} -> {} Hz): {}", from_rate, to_rate, e))?;

    let chunk_in = resampler.input_frames_next();
    let expected_len =
        (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    let mut output = Vec::with_capacity(expected_len + chunk_in);

    let mut chunk = vec![0.0f32; chunk_in];
    for block in samples.chunks(chunk_in) {
        chunk[..block.len()].copy_from_slice(block);
        chunk[block.len()..].fill(0.0);

        let processed = resampler
            .process(std::slice::from_ref(&chunk), None)
            .map_err(|e| format!("Resampling failed: {}", e))?;
        if let Some(channel) = processed.into_iter().next() {
            output.extend(channel);
        }
    }

    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_downmix_stereo_averages_channels() {
        let mut mono = Vec::new();
        downmix_into(&mut mono, &[0.5, 0.3, 0.8, 0.2, 1.0, 0.0], 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.4).abs() < 1e-6);
        assert!((mono[1] - 0.5).abs() < 1e-6);
        assert!((mono[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_downmix_mono_is_copy() {
        let mut mono = vec![0.1f32];
        downmix_into(&mut mono, &[0.5, 0.8], 1);
        assert_eq!(mono, vec![0.1, 0.5, 0.8]);
    }

    #[test]
    fn test_centered_excerpt_half() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let excerpt = centered_excerpt(&samples, 0.5);
        assert_eq!(excerpt.len(), 50);
        assert_eq!(excerpt[0], 25.0);
        assert_eq!(excerpt[49], 74.0);
    }

    #[test]
    fn test_centered_excerpt_full_and_empty() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(centered_excerpt(&samples, 1.0), &samples[..]);
        assert!(centered_excerpt(&[], 0.3).is_empty());
    }

    #[test]
    fn test_resample_length_ratio() {
        let samples: Vec<f32> = (0..10000).map(|i| i as f32 / 10000.0).collect();
        let out = resample(&samples, 22050, 44100).unwrap();
        assert!((out.len() as i64 - 20000).abs() < 5, "len {}", out.len());
    }

    #[test]
    fn test_resample_preserves_tone_amplitude() {
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 48000.0).sin())
            .collect();
        let out = resample(&samples, 48000, 44100).unwrap();

        // Skip the filter transients at both ends
        let interior = &out[500..out.len() - 500];
        let peak = interior.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
        assert!(peak > 0.9 && peak < 1.1, "peak {}", peak);
    }

    #[test]
    fn test_decode_missing_file_is_typed() {
        let err = decode(Path::new("/nonexistent/track.mp3"), 44100).unwrap_err();
        assert!(matches!(err, HarmixError::FileNotFound(_)));
    }
}
