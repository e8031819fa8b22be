//! # Media Probing
//!
//! Reads container headers of the prepared playback file to learn the
//! duration and codec before the engine is asked to load it. A file that
//! cannot be probed fails the session instead of reaching the engine.

use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// What the probe learned about a file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// `None` for streams without a frame count
    pub duration: Option<Duration>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub codec: String,
}

/// Inspects an audio file. Blocking; called from `spawn_blocking`.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

#[cfg(feature = "symphonia-probe")]
pub use self::symphonia_probe::SymphoniaProbe;

#[cfg(feature = "symphonia-probe")]
mod symphonia_probe {
    use super::{MediaInfo, MediaProbe};
    use crate::error::{PlaybackError, Result};
    use std::fs::File;
    use std::path::Path;
    use std::time::Duration;
    use symphonia::core::codecs::CODEC_TYPE_NULL;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;
    use tracing::{debug, warn};

    /// [`MediaProbe`] over symphonia's format registry.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SymphoniaProbe;

    impl SymphoniaProbe {
        pub fn new() -> Self {
            Self
        }
    }

    impl MediaProbe for SymphoniaProbe {
        fn probe(&self, path: &Path) -> Result<MediaInfo> {
            let file = File::open(path).map_err(|e| {
                PlaybackError::Probe(format!("cannot open {}: {}", path.display(), e))
            })?;
            let stream = MediaSourceStream::new(Box::new(file), Default::default());

            let mut hint = Hint::new();
            if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
                hint.with_extension(extension);
            }

            let probed = symphonia::default::get_probe()
                .format(
                    &hint,
                    stream,
                    &FormatOptions::default(),
                    &MetadataOptions::default(),
                )
                .map_err(|e| {
                    warn!(error = %e, "Format probe failed");
                    PlaybackError::Probe(format!("unrecognized format: {}", e))
                })?;

            let track = probed
                .format
                .tracks()
                .iter()
                .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or_else(|| PlaybackError::Probe("no audio track".to_string()))?;

            let params = &track.codec_params;
            let duration = match (params.n_frames, params.time_base, params.sample_rate) {
                (Some(frames), Some(time_base), _) => {
                    let time = time_base.calc_time(frames);
                    Some(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac))
                }
                (Some(frames), None, Some(rate)) if rate > 0 => {
                    Some(Duration::from_secs_f64(frames as f64 / rate as f64))
                }
                _ => None,
            };

            let codec = symphonia::default::get_codecs()
                .get_codec(params.codec)
                .map(|descriptor| descriptor.short_name.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let info = MediaInfo {
                duration,
                sample_rate: params.sample_rate,
                channels: params.channels.map(|channels| channels.count() as u16),
                codec,
            };
            debug!(?info, "Probed playback file");
            Ok(info)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;

        /// Minimal PCM WAV: 16-bit mono at 8 kHz.
        fn wav(samples: u32) -> Vec<u8> {
            let data_len = samples * 2;
            let mut out = Vec::new();
            out.extend_from_slice(b"RIFF");
            out.extend_from_slice(&(36 + data_len).to_le_bytes());
            out.extend_from_slice(b"WAVEfmt ");
            out.extend_from_slice(&16u32.to_le_bytes());
            out.extend_from_slice(&1u16.to_le_bytes());
            out.extend_from_slice(&1u16.to_le_bytes());
            out.extend_from_slice(&8000u32.to_le_bytes());
            out.extend_from_slice(&16000u32.to_le_bytes());
            out.extend_from_slice(&2u16.to_le_bytes());
            out.extend_from_slice(&16u16.to_le_bytes());
            out.extend_from_slice(b"data");
            out.extend_from_slice(&data_len.to_le_bytes());
            out.resize(out.len() + data_len as usize, 0);
            out
        }

        #[test]
        fn probes_wav_duration() {
            let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
            file.write_all(&wav(16_000)).unwrap();

            let info = SymphoniaProbe::new().probe(file.path()).unwrap();
            assert_eq!(info.sample_rate, Some(8000));
            assert_eq!(info.channels, Some(1));
            let duration = info.duration.unwrap();
            assert!((duration.as_secs_f64() - 2.0).abs() < 0.01, "{duration:?}");
        }

        #[test]
        fn rejects_non_audio() {
            let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
            file.write_all(b"<html><body>404</body></html>").unwrap();

            let err = SymphoniaProbe::new().probe(file.path()).unwrap_err();
            assert!(matches!(err, PlaybackError::Probe(_)));
        }

        #[test]
        fn missing_file_is_a_probe_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = SymphoniaProbe::new()
                .probe(&dir.path().join("gone.mp3"))
                .unwrap_err();
            assert!(matches!(err, PlaybackError::Probe(_)), "{err:?}");
        }
    }
}
