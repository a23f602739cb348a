use std::sync::Arc;

use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::message::{Command, OutboundMessage};
use crate::models::state::RecorderState;
use crate::processing::chunked_buffer::{AppendOutcome, ChunkedSampleBuffer};
use crate::processing::wav_format::{self, WavDescriptor};
use crate::traits::capture_processor::CaptureProcessor;
use crate::traits::recorder_delegate::RecorderDelegate;

/// Maps control commands onto the capture buffer and encodes on stop.
///
/// ```text
/// record:  idle/paused → recording
/// pause:   recording → paused
/// stop:    any live state → encode + emit → idle
/// destroy: any → destroyed (terminal, chunks released)
/// full:    recording → full, reported once per recording
/// ```
pub struct RecordingController {
    state: RecorderState,
    buffer: ChunkedSampleBuffer,
    descriptor: WavDescriptor,
    delegate: Option<Arc<dyn RecorderDelegate>>,
    full_reported: bool,
}

impl RecordingController {
    pub fn new(config: &RecorderConfig) -> Result<Self, RecorderError> {
        config.validate()?;
        Ok(Self {
            state: RecorderState::Idle,
            buffer: ChunkedSampleBuffer::new(
                config.channel_count as usize,
                config.chunk_capacity(),
                config.max_chunks,
            ),
            descriptor: config.descriptor(),
            delegate: None,
            full_reported: false,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn buffer(&self) -> &ChunkedSampleBuffer {
        &self.buffer
    }

    pub fn descriptor(&self) -> &WavDescriptor {
        &self.descriptor
    }

    /// Start or resume capture. Transitions: idle/paused → recording.
    pub fn record(&mut self) {
        if self.state.can_record() {
            self.set_state(RecorderState::Recording);
        } else {
            log::debug!("record ignored in {} state", self.state.as_str());
        }
    }

    /// Suspend capture. Transitions: recording → paused.
    pub fn pause(&mut self) {
        if self.state.is_recording() {
            self.set_state(RecorderState::Paused);
        } else {
            log::debug!("pause ignored in {} state", self.state.as_str());
        }
    }

    /// Store a burst of frames if recording.
    ///
    /// Crossing the chunk ceiling moves the recorder to `Full` and emits a
    /// single `full` status; later bursts are ignored until the next stop.
    pub fn append<S: AsRef<[f32]>>(&mut self, burst: &[S]) -> AppendOutcome {
        if !self.state.is_recording() {
            return AppendOutcome::default();
        }

        let outcome = self.buffer.append(burst);
        if outcome.full && !self.full_reported {
            self.full_reported = true;
            log::info!(
                "buffer full after {} frames",
                self.buffer.total_frame_count()
            );
            self.set_state(RecorderState::Full);
            self.emit(OutboundMessage::full());
        }
        outcome
    }

    /// Encode everything captured so far, then reset to an empty `Idle` recorder.
    ///
    /// The buffer is reset even when encoding fails (e.g. `EmptyRecording`).
    pub fn stop(&mut self) -> Result<Vec<u8>, RecorderError> {
        if self.state.is_destroyed() {
            return Err(RecorderError::Destroyed);
        }

        let recording = self.buffer.trimmed_view();
        let frame_count = self.buffer.total_frame_count();
        self.buffer.reset();
        self.full_reported = false;
        self.set_state(RecorderState::Idle);

        let encoded = wav_format::encode_wav(&recording, &self.descriptor)?;
        log::info!(
            "encoded {} frames x {} channels into {} bytes",
            frame_count,
            recording.len(),
            encoded.len()
        );
        Ok(encoded)
    }

    /// Enter the terminal state and release all chunks.
    pub fn destroy(&mut self) {
        if self.state.is_destroyed() {
            return;
        }
        self.buffer.release();
        self.set_state(RecorderState::Destroyed);
    }

    fn set_state(&mut self, state: RecorderState) {
        if self.state == state {
            return;
        }
        log::debug!("recorder {} → {}", self.state.as_str(), state.as_str());
        self.state = state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }

    fn emit(&self, message: OutboundMessage) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_message(message);
        }
    }
}

impl CaptureProcessor for RecordingController {
    fn process<S: AsRef<[f32]>>(&mut self, inputs: &[S]) -> bool {
        if self.state.is_destroyed() {
            return false;
        }
        self.append(inputs);
        true
    }

    fn dispatch(&mut self, command: Command) {
        if self.state.is_destroyed() {
            return;
        }
        match command {
            Command::Record => self.record(),
            Command::Pause => self.pause(),
            Command::Destroy => self.destroy(),
            Command::Stop => match self.stop() {
                Ok(wav) => self.emit(OutboundMessage::wav(wav)),
                Err(e) => {
                    log::warn!("stop produced no wav: {}", e);
                    if let Some(ref delegate) = self.delegate {
                        delegate.on_error(&e);
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::wav_format::decode_wav;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingDelegate {
        states: Mutex<Vec<RecorderState>>,
        messages: Mutex<Vec<OutboundMessage>>,
        errors: Mutex<Vec<RecorderError>>,
    }

    impl RecorderDelegate for RecordingDelegate {
        fn on_state_changed(&self, state: RecorderState) {
            self.states.lock().push(state);
        }

        fn on_message(&self, message: OutboundMessage) {
            self.messages.lock().push(message);
        }

        fn on_error(&self, error: &RecorderError) {
            self.errors.lock().push(error.clone());
        }
    }

    fn small_config() -> RecorderConfig {
        RecorderConfig {
            sample_rate: 8,
            chunk_duration_seconds: 1,
            channel_count: 2,
            ..Default::default()
        }
    }

    fn controller_with_delegate(config: &RecorderConfig) -> (RecordingController, Arc<RecordingDelegate>) {
        let delegate = Arc::new(RecordingDelegate::default());
        let mut controller = RecordingController::new(config).unwrap();
        controller.set_delegate(delegate.clone());
        (controller, delegate)
    }

    fn burst(value: f32, frames: usize) -> Vec<Vec<f32>> {
        vec![vec![value; frames], vec![-value; frames]]
    }

    #[test]
    fn starts_idle_and_ignores_frames() {
        let mut controller = RecordingController::new(&small_config()).unwrap();

        assert_eq!(controller.state(), RecorderState::Idle);
        assert!(controller.process(&burst(0.5, 4)));
        assert_eq!(controller.buffer().total_frame_count(), 0);
    }

    #[test]
    fn record_pause_resume() {
        let (mut controller, delegate) = controller_with_delegate(&small_config());

        controller.dispatch(Command::Record);
        controller.process(&burst(0.1, 3));
        controller.dispatch(Command::Pause);
        controller.process(&burst(0.2, 5));
        controller.dispatch(Command::Record);
        controller.process(&burst(0.3, 2));

        assert_eq!(controller.buffer().total_frame_count(), 5);
        assert_eq!(
            *delegate.states.lock(),
            vec![RecorderState::Recording, RecorderState::Paused, RecorderState::Recording]
        );
    }

    #[test]
    fn record_while_recording_is_noop() {
        let (mut controller, delegate) = controller_with_delegate(&small_config());
        controller.dispatch(Command::Record);
        controller.dispatch(Command::Record);
        assert_eq!(delegate.states.lock().len(), 1);
    }

    #[test]
    fn stop_emits_wav_and_resets() {
        let (mut controller, delegate) = controller_with_delegate(&small_config());

        controller.dispatch(Command::Record);
        controller.process(&burst(0.5, 11));
        controller.dispatch(Command::Stop);

        assert_eq!(controller.state(), RecorderState::Idle);
        assert_eq!(controller.buffer().total_frame_count(), 0);
        assert_eq!(controller.buffer().chunk_count(), 1);

        let messages = delegate.messages.lock().clone();
        assert_eq!(messages.len(), 1);
        let wav = messages[0].clone().into_wav().unwrap();
        assert_eq!(wav.len(), 44 + 11 * 2 * 2);

        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.frame_count(), 11);
        assert!(decoded.channels[0].iter().all(|s| (*s - 0.5).abs() < 1e-4));
        assert!(decoded.channels[1].iter().all(|s| (*s + 0.5).abs() < 1e-4));
    }

    #[test]
    fn stop_from_paused_encodes() {
        let mut controller = RecordingController::new(&small_config()).unwrap();
        controller.record();
        controller.append(&burst(0.25, 6));
        controller.pause();

        let wav = controller.stop().unwrap();

        assert_eq!(decode_wav(&wav).unwrap().frame_count(), 6);
        assert_eq!(controller.state(), RecorderState::Idle);
    }

    #[test]
    fn empty_stop_reports_error_without_data() {
        let (mut controller, delegate) = controller_with_delegate(&small_config());

        controller.dispatch(Command::Record);
        controller.dispatch(Command::Stop);

        assert!(delegate.messages.lock().is_empty());
        assert_eq!(*delegate.errors.lock(), vec![RecorderError::EmptyRecording]);
        assert_eq!(controller.state(), RecorderState::Idle);
    }

    #[test]
    fn full_is_reported_once_and_data_kept() {
        let config = RecorderConfig {
            max_chunks: Some(2),
            ..small_config()
        };
        let (mut controller, delegate) = controller_with_delegate(&config);

        controller.dispatch(Command::Record);
        controller.process(&burst(0.5, 10));
        controller.process(&burst(0.5, 10));
        controller.dispatch(Command::Record);
        controller.process(&burst(0.5, 10));

        assert_eq!(controller.state(), RecorderState::Full);
        assert_eq!(controller.buffer().total_frame_count(), 16);
        let fulls = delegate.messages.lock().iter().filter(|m| m.is_full()).count();
        assert_eq!(fulls, 1);

        controller.dispatch(Command::Stop);
        let wav = delegate.messages.lock().last().cloned().unwrap().into_wav().unwrap();
        assert_eq!(decode_wav(&wav).unwrap().frame_count(), 16);
        assert_eq!(controller.state(), RecorderState::Idle);

        // A new recording may fill up and report again.
        controller.dispatch(Command::Record);
        controller.process(&burst(0.5, 20));
        let fulls = delegate.messages.lock().iter().filter(|m| m.is_full()).count();
        assert_eq!(fulls, 2);
    }

    #[test]
    fn pause_does_not_leave_full() {
        let config = RecorderConfig {
            max_chunks: Some(1),
            ..small_config()
        };
        let mut controller = RecordingController::new(&config).unwrap();
        controller.record();
        controller.append(&burst(0.5, 8));
        assert_eq!(controller.state(), RecorderState::Full);

        controller.pause();
        controller.record();
        assert_eq!(controller.state(), RecorderState::Full);
    }

    #[test]
    fn commands_after_destroy_have_no_effect() {
        let (mut controller, delegate) = controller_with_delegate(&small_config());

        controller.dispatch(Command::Record);
        controller.process(&burst(0.5, 3));
        controller.dispatch(Command::Destroy);
        let states_before = delegate.states.lock().len();

        assert!(!controller.process(&burst(0.5, 3)));
        controller.dispatch(Command::Record);
        controller.dispatch(Command::Stop);
        controller.handle_message(r#"{"type":"command","message":"stop"}"#);

        assert_eq!(controller.state(), RecorderState::Destroyed);
        assert_eq!(delegate.states.lock().len(), states_before);
        assert!(delegate.messages.lock().is_empty());
        assert!(delegate.errors.lock().is_empty());
        assert!(controller.buffer().is_released());
        assert_eq!(controller.stop(), Err(RecorderError::Destroyed));
    }

    #[test]
    fn json_messages_drive_commands() {
        let mut controller = RecordingController::new(&small_config()).unwrap();

        controller.handle_message(r#"{"type":"command","message":"record"}"#);
        assert_eq!(controller.state(), RecorderState::Recording);

        controller.handle_message(r#"{"type":"command","message":"pause"}"#);
        assert_eq!(controller.state(), RecorderState::Paused);
    }

    #[test]
    fn malformed_messages_are_ignored() {
        let mut controller = RecordingController::new(&small_config()).unwrap();
        controller.record();

        controller.handle_message("not json");
        controller.handle_message(r#"{"type":"command","message":"rewind"}"#);
        controller.handle_message(r#"{"type":"get","message":"position"}"#);

        assert_eq!(controller.state(), RecorderState::Recording);
    }

    #[test]
    fn float_config_encodes_ieee_float() {
        let config = RecorderConfig {
            is_float: true,
            ..small_config()
        };
        let mut controller = RecordingController::new(&config).unwrap();
        controller.record();
        controller.append(&burst(0.75, 3));

        let wav = controller.stop().unwrap();

        assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 3);
        assert_eq!(wav.len(), 44 + 3 * 2 * 4);
        assert_eq!(&wav[44..48], &0.75f32.to_le_bytes());
        assert_eq!(&wav[48..52], &(-0.75f32).to_le_bytes());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RecorderConfig {
            channel_count: 0,
            ..Default::default()
        };
        assert!(RecordingController::new(&config).is_err());
    }
}
