use crate::models::error::RecorderError;
use crate::models::message::OutboundMessage;
use crate::models::state::RecorderState;

/// Event delegate for recorder notifications.
///
/// All methods are called from the capture context, which may share a thread
/// with the real-time audio callback. Implementations should hand work off
/// rather than block.
pub trait RecorderDelegate: Send + Sync {
    /// Called when the recorder state changes.
    fn on_state_changed(&self, state: RecorderState);

    /// Called with an outbound protocol message (`full` status, encoded WAV data).
    /// The message is handed over by value.
    fn on_message(&self, message: OutboundMessage);

    /// Called when a stop fails to produce a file.
    fn on_error(&self, error: &RecorderError);
}
