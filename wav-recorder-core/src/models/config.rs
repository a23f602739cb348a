use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::RecorderError;
use crate::processing::wav_format::WavDescriptor;

/// Configuration for a recorder.
///
/// Field names serialize in camelCase so a JSON config reads the same as the
/// control protocol (`sampleRate`, `chunkDurationSeconds`, ...). Missing
/// fields fall back to [`RecorderConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Length of one buffer chunk in seconds (default: 5).
    pub chunk_duration_seconds: u32,

    /// Number of captured channels (default: 2). Fixed for the lifetime of a recording.
    pub channel_count: u16,

    /// Encode as 32-bit IEEE float instead of integer PCM (default: false).
    pub is_float: bool,

    /// Bits per sample, or None for 16 (PCM) / 32 (float).
    pub bits_per_sample: Option<u16>,

    /// Maximum number of chunks per channel (None = unlimited).
    pub max_chunks: Option<usize>,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), RecorderError> {
        if self.sample_rate == 0 {
            return Err(RecorderError::ConfigurationFailed("sample rate must be positive".into()));
        }
        if self.chunk_duration_seconds == 0 {
            return Err(RecorderError::ConfigurationFailed(
                "chunk duration must be positive".into(),
            ));
        }
        if self.channel_count == 0 {
            return Err(RecorderError::ConfigurationFailed(
                "channel count must be positive".into(),
            ));
        }
        if self.max_chunks == Some(0) {
            return Err(RecorderError::ConfigurationFailed(
                "max chunks must be positive".into(),
            ));
        }
        self.try_chunk_capacity()?;
        self.descriptor().codec()?;
        Ok(())
    }

    /// Samples per chunk per channel: `sample_rate * chunk_duration_seconds`.
    ///
    /// Saturates on overflow; `validate` rejects such configurations.
    pub fn chunk_capacity(&self) -> usize {
        self.try_chunk_capacity().unwrap_or(usize::MAX)
    }

    /// Bits per sample after applying the PCM / float default.
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
            .unwrap_or(if self.is_float { 32 } else { 16 })
    }

    /// Encoding parameters for recordings made with this configuration.
    pub fn descriptor(&self) -> WavDescriptor {
        WavDescriptor {
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
            is_float: self.is_float,
            bits_per_sample: self.bits_per_sample(),
        }
    }

    /// Parse a JSON configuration. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, RecorderError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RecorderError::ConfigurationFailed(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, RecorderError> {
        let json = fs::read_to_string(path)
            .map_err(|e| RecorderError::StorageError(format!("failed to read config: {}", e)))?;
        Self::from_json(&json)
    }

    fn try_chunk_capacity(&self) -> Result<usize, RecorderError> {
        (self.sample_rate as usize)
            .checked_mul(self.chunk_duration_seconds as usize)
            .ok_or_else(|| RecorderError::ConfigurationFailed("chunk capacity overflows".into()))
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            chunk_duration_seconds: 5,
            channel_count: 2,
            is_float: false,
            bits_per_sample: None,
            max_chunks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.chunk_capacity(), 220_500);
        assert_eq!(config.bits_per_sample(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn float_defaults_to_32_bits() {
        let config = RecorderConfig {
            is_float: true,
            ..Default::default()
        };
        assert_eq!(config.bits_per_sample(), 32);
        assert_eq!(config.descriptor().format_tag(), 3);
    }

    #[test]
    fn parses_camel_case_json_with_defaults() {
        let config =
            RecorderConfig::from_json(r#"{"sampleRate": 48000, "channelCount": 1, "bitsPerSample": 24}"#)
                .unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channel_count, 1);
        assert_eq!(config.bits_per_sample(), 24);
        assert_eq!(config.chunk_duration_seconds, 5);
        assert_eq!(config.max_chunks, None);
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_rate = RecorderConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(zero_rate.validate(), Err(RecorderError::ConfigurationFailed(_))));

        let no_channels = RecorderConfig {
            channel_count: 0,
            ..Default::default()
        };
        assert!(no_channels.validate().is_err());

        let no_chunks = RecorderConfig {
            max_chunks: Some(0),
            ..Default::default()
        };
        assert!(no_chunks.validate().is_err());
    }

    #[test]
    fn rejects_unencodable_bit_depth() {
        let config = RecorderConfig {
            bits_per_sample: Some(40),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RecorderError::UnsupportedBitDepth { bits_per_sample: 40, .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        assert!(matches!(
            RecorderConfig::from_json("{not json"),
            Err(RecorderError::ConfigurationFailed(_))
        ));
    }
}
