//! # wav-recorder-core
//!
//! Chunked multi-channel audio capture and WAV encoding.
//!
//! A host feeds fixed-size bursts of per-channel `f32` frames into a
//! [`RecordingController`], which appends them to a [`ChunkedSampleBuffer`]
//! while recording. On `stop` the captured frames are trimmed, interleaved and
//! encoded into a RIFF/WAVE file (integer PCM or IEEE float) that is handed
//! back through the outbound message channel.
//!
//! ## Architecture
//!
//! ```text
//! wav-recorder-core (this crate)
//! ├── traits/       ← RecorderDelegate, CaptureProcessor
//! ├── models/       ← RecorderError, RecorderState, RecorderConfig, Command, OutboundMessage
//! ├── processing/   ← interleave, SampleCodec, WAV encode/decode, ChunkedSampleBuffer
//! ├── session/      ← RecordingController, CaptureContext (threaded, message driven)
//! └── storage/      ← WavFileSink, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::RecorderConfig;
pub use models::error::RecorderError;
pub use models::message::{Command, ControlMessage, DataKind, OutboundMessage, StatusMessage};
pub use models::recording_result::{RecordingMetadata, SavedRecording};
pub use models::state::RecorderState;
pub use processing::chunked_buffer::{AppendOutcome, ChunkedSampleBuffer};
pub use processing::interleave::{common_frame_count, deinterleave, interleave};
pub use processing::sample_codec::{encode_float32, encode_int16, ByteOrder, SampleCodec};
pub use processing::wav_format::{decode_wav, encode_wav, generate_wav_header, DecodedWav, WavDescriptor};
pub use session::capture_context::{CaptureContext, CaptureDiagnostics, CaptureInput};
pub use session::controller::RecordingController;
pub use storage::wav_sink::WavFileSink;
pub use traits::capture_processor::CaptureProcessor;
pub use traits::recorder_delegate::RecorderDelegate;
