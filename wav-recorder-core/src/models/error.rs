use thiserror::Error;

/// Errors that can occur while capturing or encoding a recording.
///
/// A full buffer is not an error: it is reported as a status message and the
/// captured data stays encodable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    ShapeMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported bit depth: {bits_per_sample} bits per sample, {bits_per_byte} bits per byte")]
    UnsupportedBitDepth { bits_per_sample: u16, bits_per_byte: u8 },

    #[error("recording is empty")]
    EmptyRecording,

    #[error("recording too large for a RIFF container: {data_size} data bytes")]
    RecordingTooLarge { data_size: u64 },

    #[error("recorder destroyed")]
    Destroyed,

    #[error("capture context disconnected")]
    Disconnected,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("invalid wav: {0}")]
    InvalidWav(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
