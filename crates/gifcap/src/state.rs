//! Capture state machine
//!
//! Decides whether the producer may admit a frame on a given tick.
//! `CaptureOnce` is transient: the next admission consumes it and the machine
//! falls back to the stable state remembered in `resume_to`.

use serde::{Deserialize, Serialize};

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureState {
    /// No active session
    #[default]
    Idle,
    /// Frames admitted on every due capture tick
    Recording,
    /// Frames rejected, session retained
    Paused,
    /// Admit exactly one frame, then revert
    CaptureOnce,
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::CaptureOnce => "capture-once",
        };
        f.write_str(name)
    }
}

/// Recording state machine for one session
#[derive(Debug, Clone, Default)]
pub struct CaptureStateMachine {
    state: CaptureState,
    resume_to: CaptureState,
}

impl CaptureStateMachine {
    /// Create a machine in `Idle`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Whether frames are being (or about to be) admitted
    #[must_use]
    pub fn is_recording(&self) -> bool {
        matches!(self.state, CaptureState::Recording | CaptureState::CaptureOnce)
    }

    /// Begin continuous recording
    pub fn start(&mut self) {
        self.state = CaptureState::Recording;
        self.resume_to = CaptureState::Recording;
    }

    /// Pause recording; returns whether the state changed
    pub fn stop(&mut self) -> bool {
        match self.state {
            CaptureState::Recording | CaptureState::CaptureOnce => {
                self.state = CaptureState::Paused;
                self.resume_to = CaptureState::Paused;
                true
            }
            CaptureState::Paused | CaptureState::Idle => false,
        }
    }

    /// Resume recording after a pause; false from `Idle`
    pub fn resume(&mut self) -> bool {
        match self.state {
            CaptureState::Idle => false,
            CaptureState::Recording => true,
            CaptureState::Paused | CaptureState::CaptureOnce => {
                self.state = CaptureState::Recording;
                self.resume_to = CaptureState::Recording;
                true
            }
        }
    }

    /// Pause unconditionally, keeping `Idle` as is
    pub fn pause(&mut self) {
        if self.state != CaptureState::Idle {
            self.state = CaptureState::Paused;
            self.resume_to = CaptureState::Paused;
        }
    }

    /// Admit exactly one frame on the next tick
    ///
    /// Continuous recording stays continuous afterwards; anything else
    /// lands in `Paused`.
    pub fn request_single(&mut self) {
        self.resume_to = match self.state {
            CaptureState::Recording => CaptureState::Recording,
            CaptureState::CaptureOnce => self.resume_to,
            CaptureState::Idle | CaptureState::Paused => CaptureState::Paused,
        };
        self.state = CaptureState::CaptureOnce;
    }

    /// Decide admission for one producer tick
    ///
    /// `tick_due` tells whether the capture rate allows a continuous frame now.
    pub fn admit(&mut self, tick_due: bool) -> bool {
        match self.state {
            CaptureState::Recording => tick_due,
            CaptureState::CaptureOnce => {
                self.state = self.resume_to;
                true
            }
            CaptureState::Paused | CaptureState::Idle => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod transition_tests {
        use super::*;

        #[test]
        fn test_new_is_idle() {
            let machine = CaptureStateMachine::new();
            assert_eq!(machine.state(), CaptureState::Idle);
            assert!(!machine.is_recording());
        }

        #[test]
        fn test_start_then_stop_twice() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            assert_eq!(machine.state(), CaptureState::Recording);

            assert!(machine.stop());
            assert!(!machine.stop());
            assert_eq!(machine.state(), CaptureState::Paused);
        }

        #[test]
        fn test_stop_from_idle() {
            let mut machine = CaptureStateMachine::new();
            assert!(!machine.stop());
            assert_eq!(machine.state(), CaptureState::Idle);
        }

        #[test]
        fn test_resume() {
            let mut machine = CaptureStateMachine::new();
            assert!(!machine.resume());

            machine.start();
            machine.stop();
            assert!(machine.resume());
            assert_eq!(machine.state(), CaptureState::Recording);
        }

        #[test]
        fn test_pause_keeps_idle() {
            let mut machine = CaptureStateMachine::new();
            machine.pause();
            assert_eq!(machine.state(), CaptureState::Idle);

            machine.start();
            machine.pause();
            assert_eq!(machine.state(), CaptureState::Paused);
        }

        #[test]
        fn test_never_returns_to_idle() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            machine.stop();
            machine.request_single();
            assert!(machine.admit(false));
            machine.pause();
            machine.resume();
            machine.stop();
            assert_eq!(machine.state(), CaptureState::Paused);
        }

        #[test]
        fn test_display() {
            assert_eq!(CaptureState::CaptureOnce.to_string(), "capture-once");
            assert_eq!(CaptureState::Recording.to_string(), "recording");
        }
    }

    mod admission_tests {
        use super::*;

        #[test]
        fn test_recording_follows_tick() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            assert!(machine.admit(true));
            assert!(!machine.admit(false));
            assert_eq!(machine.state(), CaptureState::Recording);
        }

        #[test]
        fn test_paused_rejects() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            machine.stop();
            assert!(!machine.admit(true));
        }

        #[test]
        fn test_single_from_paused_returns_to_paused() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            machine.stop();

            machine.request_single();
            assert_eq!(machine.state(), CaptureState::CaptureOnce);
            assert!(machine.is_recording());

            assert!(machine.admit(false));
            assert_eq!(machine.state(), CaptureState::Paused);
            assert!(!machine.admit(true));
        }

        #[test]
        fn test_single_from_idle_returns_to_paused() {
            let mut machine = CaptureStateMachine::new();
            machine.request_single();
            assert!(machine.admit(false));
            assert_eq!(machine.state(), CaptureState::Paused);
        }

        #[test]
        fn test_single_while_recording_stays_recording() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            machine.request_single();

            assert!(machine.admit(false));
            assert_eq!(machine.state(), CaptureState::Recording);
        }

        #[test]
        fn test_repeated_single_requests_keep_target() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            machine.request_single();
            machine.request_single();
            assert!(machine.admit(false));
            assert_eq!(machine.state(), CaptureState::Recording);
        }

        #[test]
        fn test_stop_cancels_pending_single() {
            let mut machine = CaptureStateMachine::new();
            machine.start();
            machine.stop();
            machine.request_single();
            assert!(machine.stop());
            assert!(!machine.admit(true));
        }
    }
}
