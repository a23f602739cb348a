/// Recorder state machine.
///
/// State transitions:
/// ```text
/// idle → recording ↔ paused
///          ↓           ↓
///        full ──── stop ──→ idle
///
/// any → destroyed (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
    Paused,
    Full,
    Destroyed,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Whether `record` may move this state to `Recording`.
    pub fn can_record(&self) -> bool {
        matches!(self, Self::Idle | Self::Paused)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Full => "full",
            Self::Destroyed => "destroyed",
        }
    }
}
