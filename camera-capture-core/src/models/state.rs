/// Still-capture convergence state machine.
///
/// State transitions:
/// ```text
/// Preview → WaitingLock → Captured
///               ↓             ↑
///        WaitingPrecapture → WaitingPrecaptureDone
/// ```
///
/// The sequence always resets to `Preview` when the capture finishes,
/// whether it succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Showing the live preview; no still capture in progress.
    Preview,
    /// Autofocus trigger submitted, waiting for the lens to lock.
    WaitingLock,
    /// Exposure precapture trigger submitted, waiting for it to begin.
    WaitingPrecapture,
    /// Precapture metering running, waiting for it to settle.
    WaitingPrecaptureDone,
    /// Final high-resolution capture submitted.
    Captured,
}

impl LockState {
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview)
    }

    /// Whether a still-capture sequence is currently in flight.
    pub fn in_sequence(&self) -> bool {
        !self.is_preview()
    }
}

/// Video recording state machine.
///
/// State transitions: `Idle → Recording ↔ Paused → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
    Paused,
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}
