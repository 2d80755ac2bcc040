//! Pure transition core of the still-capture convergence sequence.
//!
//! Consumes the 3A fields of every capture result delivered while a still
//! capture is in flight and answers with the next action to take. All
//! hardware submission stays with the session manager.

use crate::models::request::{AutoExposureStatus, AutoFocusStatus, CaptureUpdate};
use crate::models::state::LockState;

/// What the session manager must do after feeding a result in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockAction {
    None,
    /// Issue the auto-exposure precapture trigger.
    RunPrecapture,
    /// Submit the final high-resolution capture.
    RunCapture,
}

#[derive(Debug)]
pub(crate) struct LockSequence {
    state: LockState,
}

impl LockSequence {
    pub(crate) fn new() -> Self {
        Self {
            state: LockState::Preview,
        }
    }

    pub(crate) fn state(&self) -> LockState {
        self.state
    }

    /// Enter the sequence: the autofocus trigger has been submitted.
    pub(crate) fn begin(&mut self) {
        self.state = LockState::WaitingLock;
    }

    /// Leave the sequence, back to plain preview.
    pub(crate) fn reset(&mut self) {
        self.state = LockState::Preview;
    }

    /// Feed one capture result through the state machine.
    pub(crate) fn process(&mut self, update: &CaptureUpdate) -> LockAction {
        match self.state {
            LockState::Preview | LockState::Captured => LockAction::None,
            LockState::WaitingLock => match update.af {
                Some(AutoFocusStatus::FocusedLocked) | Some(AutoFocusStatus::NotFocusedLocked) => {
                    match update.ae {
                        // Unknown exposure state is treated as converged so a
                        // device that never reports AE cannot stall the capture.
                        None | Some(AutoExposureStatus::Converged) => {
                            self.state = LockState::Captured;
                            LockAction::RunCapture
                        }
                        Some(_) => {
                            self.state = LockState::WaitingPrecapture;
                            LockAction::RunPrecapture
                        }
                    }
                }
                // Unknown, inactive, or still scanning: keep waiting.
                _ => LockAction::None,
            },
            LockState::WaitingPrecapture => match update.ae {
                None
                | Some(AutoExposureStatus::Precapture)
                | Some(AutoExposureStatus::FlashRequired) => {
                    self.state = LockState::WaitingPrecaptureDone;
                    LockAction::None
                }
                Some(_) => LockAction::None,
            },
            LockState::WaitingPrecaptureDone => match update.ae {
                Some(AutoExposureStatus::Precapture) => LockAction::None,
                _ => {
                    self.state = LockState::Captured;
                    LockAction::RunCapture
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(af: Option<AutoFocusStatus>, ae: Option<AutoExposureStatus>) -> CaptureUpdate {
        CaptureUpdate::new(af, ae)
    }

    #[test]
    fn idle_sequence_ignores_results() {
        let mut seq = LockSequence::new();
        let action = seq.process(&update(
            Some(AutoFocusStatus::FocusedLocked),
            Some(AutoExposureStatus::Converged),
        ));
        assert_eq!(action, LockAction::None);
        assert_eq!(seq.state(), LockState::Preview);
    }

    #[test]
    fn converged_exposure_captures_directly() {
        let mut seq = LockSequence::new();
        seq.begin();

        // Lens still scanning: stay put.
        assert_eq!(
            seq.process(&update(Some(AutoFocusStatus::ActiveScan), None)),
            LockAction::None
        );
        assert_eq!(seq.state(), LockState::WaitingLock);

        let action = seq.process(&update(
            Some(AutoFocusStatus::FocusedLocked),
            Some(AutoExposureStatus::Converged),
        ));
        assert_eq!(action, LockAction::RunCapture);
        assert_eq!(seq.state(), LockState::Captured);
    }

    #[test]
    fn unknown_exposure_counts_as_converged() {
        let mut seq = LockSequence::new();
        seq.begin();
        let action = seq.process(&update(Some(AutoFocusStatus::NotFocusedLocked), None));
        assert_eq!(action, LockAction::RunCapture);
    }

    #[test]
    fn unknown_focus_state_stays_waiting() {
        let mut seq = LockSequence::new();
        seq.begin();
        assert_eq!(seq.process(&update(None, None)), LockAction::None);
        assert_eq!(
            seq.process(&update(Some(AutoFocusStatus::Inactive), None)),
            LockAction::None
        );
        assert_eq!(seq.state(), LockState::WaitingLock);
    }

    #[test]
    fn precapture_path_walks_all_states() {
        let mut seq = LockSequence::new();
        seq.begin();

        let action = seq.process(&update(
            Some(AutoFocusStatus::FocusedLocked),
            Some(AutoExposureStatus::FlashRequired),
        ));
        assert_eq!(action, LockAction::RunPrecapture);
        assert_eq!(seq.state(), LockState::WaitingPrecapture);

        let action = seq.process(&update(None, Some(AutoExposureStatus::Precapture)));
        assert_eq!(action, LockAction::None);
        assert_eq!(seq.state(), LockState::WaitingPrecaptureDone);

        // Still metering: wait.
        let action = seq.process(&update(None, Some(AutoExposureStatus::Precapture)));
        assert_eq!(action, LockAction::None);

        let action = seq.process(&update(None, Some(AutoExposureStatus::Converged)));
        assert_eq!(action, LockAction::RunCapture);
        assert_eq!(seq.state(), LockState::Captured);
    }

    #[test]
    fn never_stalls_on_terminal_result_combinations() {
        // Whatever mix of terminal AF states and AE states arrives, a capture
        // is reached in a bounded number of results.
        let af_terminal = [
            AutoFocusStatus::FocusedLocked,
            AutoFocusStatus::NotFocusedLocked,
        ];
        let ae_values = [
            None,
            Some(AutoExposureStatus::Searching),
            Some(AutoExposureStatus::Converged),
            Some(AutoExposureStatus::FlashRequired),
            Some(AutoExposureStatus::Precapture),
            Some(AutoExposureStatus::Locked),
        ];

        for af in af_terminal {
            for ae in ae_values {
                let mut seq = LockSequence::new();
                seq.begin();

                let mut action = seq.process(&update(Some(af), ae));
                let mut steps = 0;
                while action != LockAction::RunCapture {
                    // Drive the sequence with a settled exposure result.
                    action = seq.process(&update(None, Some(AutoExposureStatus::Converged)));
                    steps += 1;
                    assert!(steps < 4, "stalled for af={:?} ae={:?}", af, ae);
                }
                assert_eq!(seq.state(), LockState::Captured);
            }
        }
    }

    #[test]
    fn results_after_capture_are_ignored() {
        let mut seq = LockSequence::new();
        seq.begin();
        seq.process(&update(Some(AutoFocusStatus::FocusedLocked), None));
        assert_eq!(seq.state(), LockState::Captured);

        let action = seq.process(&update(
            Some(AutoFocusStatus::FocusedLocked),
            Some(AutoExposureStatus::Converged),
        ));
        assert_eq!(action, LockAction::None);

        seq.reset();
        assert_eq!(seq.state(), LockState::Preview);
    }
}
