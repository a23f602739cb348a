use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::message::{Command, OutboundMessage};
use crate::models::state::RecorderState;
use crate::session::controller::RecordingController;
use crate::traits::capture_processor::CaptureProcessor;
use crate::traits::recorder_delegate::RecorderDelegate;

/// Input delivered to the capture context, processed strictly in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureInput {
    /// One burst of frames, one `Vec` per channel.
    Frames(Vec<Vec<f32>>),
    Command(Command),
    /// Raw JSON control message.
    Message(String),
}

/// Counters for debugging a capture context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDiagnostics {
    pub bursts_received: u64,
    pub bursts_captured: u64,
    pub frames_buffered: usize,
    pub commands_received: u64,
    pub wavs_emitted: u64,
    pub status_messages: u64,
    pub encode_failures: u64,
}

struct SharedState {
    state: RecorderState,
    diagnostics: CaptureDiagnostics,
}

/// Forwards controller events to the outbound queue and the shared snapshot.
struct ForwardingDelegate {
    output_tx: Sender<OutboundMessage>,
    shared: Arc<Mutex<SharedState>>,
    inner: Option<Arc<dyn RecorderDelegate>>,
}

impl RecorderDelegate for ForwardingDelegate {
    fn on_state_changed(&self, state: RecorderState) {
        self.shared.lock().state = state;
        if let Some(ref inner) = self.inner {
            inner.on_state_changed(state);
        }
    }

    fn on_message(&self, message: OutboundMessage) {
        match message {
            OutboundMessage::Status { message: status } => {
                self.shared.lock().diagnostics.status_messages += 1;
                if let Some(ref inner) = self.inner {
                    inner.on_message(OutboundMessage::Status { message: status });
                }
            }
            // The payload moves into the queue only.
            OutboundMessage::Data { .. } => self.shared.lock().diagnostics.wavs_emitted += 1,
        }
        if self.output_tx.send(message).is_err() {
            log::warn!("outbound message dropped: receiver gone");
        }
    }

    fn on_error(&self, error: &RecorderError) {
        self.shared.lock().diagnostics.encode_failures += 1;
        if let Some(ref inner) = self.inner {
            inner.on_error(error);
        }
    }
}

/// A recorder running on its own thread, reachable only through messages.
///
/// ```text
/// [control side] ─ CaptureInput ─→ [capture thread: RecordingController]
///       ↑                                         │
///       └──────────── OutboundMessage ────────────┘
/// ```
///
/// The thread ends after `destroy` or once every input sender is dropped.
pub struct CaptureContext {
    input_tx: Option<Sender<CaptureInput>>,
    output_rx: Receiver<OutboundMessage>,
    shared: Arc<Mutex<SharedState>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CaptureContext {
    pub fn spawn(config: &RecorderConfig) -> Result<Self, RecorderError> {
        Self::spawn_with_delegate(config, None)
    }

    /// Spawn the capture thread. `delegate` additionally receives state
    /// changes, errors and status messages; encoded WAV data is delivered
    /// only through [`messages`](Self::messages).
    pub fn spawn_with_delegate(
        config: &RecorderConfig,
        delegate: Option<Arc<dyn RecorderDelegate>>,
    ) -> Result<Self, RecorderError> {
        let mut controller = RecordingController::new(config)?;

        let (input_tx, input_rx) = unbounded();
        let (output_tx, output_rx) = unbounded();
        let shared = Arc::new(Mutex::new(SharedState {
            state: controller.state(),
            diagnostics: CaptureDiagnostics::default(),
        }));

        controller.set_delegate(Arc::new(ForwardingDelegate {
            output_tx,
            shared: Arc::clone(&shared),
            inner: delegate,
        }));

        let loop_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("wav-recorder-capture".into())
            .spawn(move || Self::run(controller, input_rx, loop_shared))
            .map_err(|e| {
                RecorderError::ConfigurationFailed(format!("failed to spawn capture thread: {}", e))
            })?;

        Ok(Self {
            input_tx: Some(input_tx),
            output_rx,
            shared,
            handle: Some(handle),
        })
    }

    pub fn send(&self, input: CaptureInput) -> Result<(), RecorderError> {
        self.input_tx
            .as_ref()
            .ok_or(RecorderError::Disconnected)?
            .send(input)
            .map_err(|_| RecorderError::Disconnected)
    }

    pub fn send_frames(&self, burst: Vec<Vec<f32>>) -> Result<(), RecorderError> {
        self.send(CaptureInput::Frames(burst))
    }

    pub fn send_command(&self, command: Command) -> Result<(), RecorderError> {
        self.send(CaptureInput::Command(command))
    }

    pub fn send_message(&self, json: impl Into<String>) -> Result<(), RecorderError> {
        self.send(CaptureInput::Message(json.into()))
    }

    /// Outbound messages (`full` status, encoded WAV data) in emission order.
    pub fn messages(&self) -> &Receiver<OutboundMessage> {
        &self.output_rx
    }

    /// Wait for the next outbound message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<OutboundMessage> {
        match self.output_rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.shared.lock().state
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.shared.lock().diagnostics.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Close the input queue and wait for the capture thread to finish.
    ///
    /// Inputs already queued are still processed.
    pub fn shutdown(&mut self) {
        self.input_tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("capture thread panicked");
            }
        }
    }

    fn run(
        mut controller: RecordingController,
        input_rx: Receiver<CaptureInput>,
        shared: Arc<Mutex<SharedState>>,
    ) {
        log::debug!("capture context started");

        for input in input_rx.iter() {
            let keep_running = match input {
                CaptureInput::Frames(burst) => {
                    let before = controller.buffer().total_frame_count();
                    let running = controller.process(&burst);
                    let after = controller.buffer().total_frame_count();

                    let mut s = shared.lock();
                    s.diagnostics.bursts_received += 1;
                    if after > before {
                        s.diagnostics.bursts_captured += 1;
                    }
                    running
                }
                CaptureInput::Command(command) => {
                    shared.lock().diagnostics.commands_received += 1;
                    controller.dispatch(command);
                    !controller.state().is_destroyed()
                }
                CaptureInput::Message(json) => {
                    controller.handle_message(&json);
                    !controller.state().is_destroyed()
                }
            };

            shared.lock().diagnostics.frames_buffered = controller.buffer().total_frame_count();
            if !keep_running {
                break;
            }
        }
        log::debug!("capture context stopped in {} state", controller.state().as_str());
    }
}

impl Drop for CaptureContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn config() -> RecorderConfig {
        RecorderConfig {
            sample_rate: 100,
            chunk_duration_seconds: 1,
            channel_count: 2,
            ..Default::default()
        }
    }

    fn burst(frames: usize) -> Vec<Vec<f32>> {
        vec![vec![0.25; frames], vec![-0.25; frames]]
    }

    #[test]
    fn stop_delivers_wav_over_channel() {
        let ctx = CaptureContext::spawn(&config()).unwrap();

        ctx.send_command(Command::Record).unwrap();
        for _ in 0..3 {
            ctx.send_frames(burst(128)).unwrap();
        }
        ctx.send_command(Command::Stop).unwrap();

        let message = ctx.recv_timeout(TIMEOUT).expect("wav message");
        let wav = message.into_wav().expect("data message");
        assert_eq!(wav.len(), 44 + 3 * 128 * 2 * 2);
    }

    #[test]
    fn destroy_ends_the_thread() {
        let mut ctx = CaptureContext::spawn(&config()).unwrap();

        ctx.send_message(Command::Record.to_json()).unwrap();
        ctx.send_frames(burst(10)).unwrap();
        ctx.send_message(Command::Destroy.to_json()).unwrap();
        ctx.shutdown();

        assert_eq!(ctx.state(), RecorderState::Destroyed);
        assert!(!ctx.is_running());
        assert!(ctx.send_command(Command::Stop).is_err());
        assert!(ctx.messages().try_recv().is_err());
    }

    #[test]
    fn stop_and_destroy_clear_frames_buffered() {
        let mut stopped = CaptureContext::spawn(&config()).unwrap();
        stopped.send_command(Command::Record).unwrap();
        stopped.send_frames(burst(50)).unwrap();
        stopped.send_command(Command::Stop).unwrap();
        stopped.shutdown();

        assert!(stopped.recv_timeout(TIMEOUT).and_then(OutboundMessage::into_wav).is_some());
        assert_eq!(stopped.state(), RecorderState::Idle);
        assert_eq!(stopped.diagnostics().frames_buffered, 0);

        let mut destroyed = CaptureContext::spawn(&config()).unwrap();
        destroyed.send_command(Command::Record).unwrap();
        destroyed.send_frames(burst(20)).unwrap();
        destroyed.send_command(Command::Destroy).unwrap();
        destroyed.shutdown();

        assert_eq!(destroyed.diagnostics().frames_buffered, 0);
    }

    #[derive(Default)]
    struct MessageLog {
        messages: Mutex<Vec<OutboundMessage>>,
    }

    impl RecorderDelegate for MessageLog {
        fn on_state_changed(&self, _state: RecorderState) {}

        fn on_message(&self, message: OutboundMessage) {
            self.messages.lock().push(message);
        }

        fn on_error(&self, _error: &RecorderError) {}
    }

    #[test]
    fn wav_data_only_travels_through_the_queue() {
        let log = Arc::new(MessageLog::default());
        let ceiling = RecorderConfig {
            max_chunks: Some(1),
            ..config()
        };
        let ctx = CaptureContext::spawn_with_delegate(&ceiling, Some(log.clone())).unwrap();

        ctx.send_command(Command::Record).unwrap();
        ctx.send_frames(burst(150)).unwrap();
        ctx.send_command(Command::Stop).unwrap();

        assert!(ctx.recv_timeout(TIMEOUT).expect("full status").is_full());
        let wav = ctx.recv_timeout(TIMEOUT).and_then(OutboundMessage::into_wav).expect("wav");
        assert_eq!(wav.len(), 44 + 100 * 2 * 2);

        assert_eq!(*log.messages.lock(), vec![OutboundMessage::full()]);
        let diagnostics = ctx.diagnostics();
        assert_eq!(diagnostics.status_messages, 1);
        assert_eq!(diagnostics.wavs_emitted, 1);
    }

    #[test]
    fn diagnostics_count_inputs() {
        let mut ctx = CaptureContext::spawn(&config()).unwrap();

        ctx.send_frames(burst(5)).unwrap(); // idle: ignored
        ctx.send_command(Command::Record).unwrap();
        ctx.send_frames(burst(5)).unwrap();
        ctx.send_frames(burst(5)).unwrap();
        ctx.send_message("garbage").unwrap();
        ctx.shutdown();

        let diagnostics = ctx.diagnostics();
        assert_eq!(diagnostics.bursts_received, 3);
        assert_eq!(diagnostics.bursts_captured, 2);
        assert_eq!(diagnostics.frames_buffered, 10);
        assert_eq!(diagnostics.commands_received, 1);
        assert_eq!(ctx.state(), RecorderState::Recording);
    }
}
