use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::processing::wav_format::DecodedWav;

/// A WAV file written by the storage sink.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecording {
    pub file_path: PathBuf,
    pub metadata: RecordingMetadata,
}

/// Metadata stored alongside a saved recording as a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    /// Position in the sink's numbering (1-based).
    pub number: u32,
    pub file_path: String,
    pub checksum: String,
    pub created_at: String,
    pub sample_rate: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
    pub is_float: bool,
    pub frame_count: usize,
    pub duration_secs: f64,
    pub size_bytes: u64,
}

impl RecordingMetadata {
    /// Describe a decoded recording saved at `file_path`.
    pub fn from_decoded(
        number: u32,
        file_path: &str,
        checksum: &str,
        size_bytes: u64,
        decoded: &DecodedWav,
    ) -> Self {
        let frame_count = decoded.frame_count();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            number,
            file_path: file_path.to_string(),
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sample_rate: decoded.descriptor.sample_rate,
            channel_count: decoded.descriptor.channel_count,
            bits_per_sample: decoded.descriptor.bits_per_sample,
            is_float: decoded.descriptor.is_float,
            frame_count,
            duration_secs: frame_count as f64 / decoded.descriptor.sample_rate as f64,
            size_bytes,
        }
    }
}
