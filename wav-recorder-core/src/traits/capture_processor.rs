use crate::models::message::{Command, ControlMessage};

/// Interface a host audio runtime drives.
///
/// The runtime calls [`process`](Self::process) once per burst of frames and
/// keeps doing so while it returns `true`. Control commands arrive through
/// [`dispatch`](Self::dispatch), in order, on the same context.
pub trait CaptureProcessor {
    /// Handle one burst (one sample slice per channel). Returns whether the
    /// host should keep calling.
    fn process<S: AsRef<[f32]>>(&mut self, inputs: &[S]) -> bool;

    /// Apply a control command.
    fn dispatch(&mut self, command: Command);

    /// Parse and apply a JSON control message.
    ///
    /// Malformed and unsupported messages are logged and ignored.
    fn handle_message(&mut self, json: &str) {
        match ControlMessage::parse(json) {
            Ok(ControlMessage::Command(command)) => self.dispatch(command),
            Ok(ControlMessage::Unsupported { kind, message }) => {
                log::warn!("ignoring unsupported {:?} message {:?}", kind, message);
            }
            Err(e) => log::warn!("ignoring control message: {}", e),
        }
    }
}
