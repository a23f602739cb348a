use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crossbeam_channel::{after, select};
use wav_recorder_core::{
    CaptureContext, Command, OutboundMessage, RecorderConfig, RecorderError, WavFileSink,
};

/// Frames per burst, matching a typical audio render quantum.
const BURST_FRAMES: usize = 128;
const TONE_HZ: f32 = 440.0;
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Sine tone generator with a per-channel phase offset.
struct Tone {
    sample_rate: f32,
    channel_count: usize,
    position: u64,
}

impl Tone {
    fn new(sample_rate: u32, channel_count: u16) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            channel_count: channel_count as usize,
            position: 0,
        }
    }

    fn burst(&mut self) -> Vec<Vec<f32>> {
        let start = self.position;
        self.position += BURST_FRAMES as u64;
        (0..self.channel_count)
            .map(|channel| {
                let phase = channel as f32 * TAU / 4.0;
                (0..BURST_FRAMES as u64)
                    .map(|i| {
                        let t = (start + i) as f32 / self.sample_rate;
                        0.5 * (TAU * TONE_HZ * t + phase).sin()
                    })
                    .collect()
            })
            .collect()
    }

    /// Send enough bursts to cover `seconds` of audio.
    fn feed(&mut self, context: &CaptureContext, seconds: f32) -> Result<usize, RecorderError> {
        let bursts = (seconds * self.sample_rate / BURST_FRAMES as f32).ceil() as usize;
        for _ in 0..bursts {
            context.send_frames(self.burst())?;
        }
        Ok(bursts * BURST_FRAMES)
    }
}

fn load_config(path: Option<&Path>) -> Result<RecorderConfig, RecorderError> {
    match path {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            RecorderConfig::load(path)
        }
        None => Ok(RecorderConfig::default()),
    }
}

/// Wait for the encoded WAV, logging any status messages that precede it.
fn wait_for_wav(context: &CaptureContext) -> Result<Vec<u8>, RecorderError> {
    let timeout = after(MESSAGE_TIMEOUT);
    loop {
        select! {
            recv(context.messages()) -> message => match message {
                Ok(OutboundMessage::Data { data, .. }) => return Ok(data),
                Ok(OutboundMessage::Status { message }) => {
                    log::warn!("recorder status: {:?}", message);
                }
                Err(_) => return Err(RecorderError::Disconnected),
            },
            recv(timeout) -> _ => {
                log::error!("no wav data after {:?}", MESSAGE_TIMEOUT);
                return Err(RecorderError::Disconnected);
            }
        }
    }
}

fn run(config_path: Option<PathBuf>, output_dir: PathBuf) -> Result<(), RecorderError> {
    let config = load_config(config_path.as_deref())?;
    config.validate()?;
    log::info!(
        "recording {} ch at {} Hz, {} bit {}",
        config.channel_count,
        config.sample_rate,
        config.bits_per_sample(),
        if config.is_float { "float" } else { "pcm" }
    );

    let context = CaptureContext::spawn(&config)?;
    let mut tone = Tone::new(config.sample_rate, config.channel_count);

    context.send_command(Command::Record)?;
    let mut expected = tone.feed(&context, 1.0)?;

    context.send_message(Command::Pause.to_json())?;
    tone.feed(&context, 0.25)?;

    context.send_command(Command::Record)?;
    expected += tone.feed(&context, 0.5)?;

    context.send_command(Command::Stop)?;

    let wav = wait_for_wav(&context)?;
    let mut sink = WavFileSink::new(output_dir);
    let saved = sink.save(&wav)?;

    let diagnostics = context.diagnostics();
    log::info!(
        "bursts received {}, captured {}, wavs emitted {}",
        diagnostics.bursts_received,
        diagnostics.bursts_captured,
        diagnostics.wavs_emitted
    );
    if saved.metadata.frame_count != expected {
        log::warn!(
            "expected {} frames, recording has {} (buffer ceiling reached?)",
            expected,
            saved.metadata.frame_count
        );
    }

    context.send_command(Command::Destroy)?;

    println!(
        "{} ({} frames, sha256 {})",
        saved.file_path.display(),
        saved.metadata.frame_count,
        saved.metadata.checksum
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    // `-` keeps the default config.
    let config_path = args.next().filter(|arg| arg != "-").map(PathBuf::from);
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    match run(config_path, output_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("recording failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
