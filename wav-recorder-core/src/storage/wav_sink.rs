use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;
use crate::models::recording_result::{RecordingMetadata, SavedRecording};
use crate::processing::wav_format::decode_wav;
use crate::storage::metadata::write_metadata;

/// Writes emitted WAV files into a directory as `recording-1.wav`,
/// `recording-2.wav`, ... with a checksum and JSON sidecar for each.
///
/// Numbering is per sink, starting at 1.
pub struct WavFileSink {
    directory: PathBuf,
    prefix: String,
    saved: u32,
}

impl WavFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_prefix(directory, "recording")
    }

    pub fn with_prefix(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            saved: 0,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of recordings saved so far.
    pub fn saved_count(&self) -> u32 {
        self.saved
    }

    /// Path the next `save` will write to.
    pub fn next_path(&self) -> PathBuf {
        self.directory.join(format!("{}-{}.wav", self.prefix, self.saved + 1))
    }

    /// Validate, write and describe one encoded WAV file.
    ///
    /// The bytes are parsed before anything touches the disk, so a malformed
    /// buffer leaves the directory and the counter unchanged.
    pub fn save(&mut self, wav: &[u8]) -> Result<SavedRecording, RecorderError> {
        let decoded = decode_wav(wav)?;

        fs::create_dir_all(&self.directory)
            .map_err(|e| RecorderError::StorageError(format!("failed to create directory: {}", e)))?;

        let number = self.saved + 1;
        let file_path = self.next_path();
        fs::write(&file_path, wav)
            .map_err(|e| RecorderError::StorageError(format!("failed to write recording: {}", e)))?;
        self.saved = number;

        let metadata = RecordingMetadata::from_decoded(
            number,
            &file_path.to_string_lossy(),
            &sha256_hex(wav),
            wav.len() as u64,
            &decoded,
        );
        write_metadata(&metadata, &file_path)?;

        log::info!(
            "saved {} ({} frames, {:.2}s)",
            file_path.display(),
            metadata.frame_count,
            metadata.duration_secs
        );

        Ok(SavedRecording { file_path, metadata })
    }
}

fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}
