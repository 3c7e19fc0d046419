//! Capture mode transitions
//!
//! `Idle → Live ↔ Frozen`, with `Live → Idle` and `Frozen → Idle` on
//! deselect, stream end or disconnect. Every (mode, event) pair has a defined
//! successor; events that do not apply to a mode leave it unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable capture mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    /// No subscription
    Idle,
    /// Subscribed, render loop running
    Live,
    /// Render loop paused, recorded snapshot is the frame source
    Frozen,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Idle => "idle",
            ModeKind::Live => "live",
            ModeKind::Frozen => "frozen",
        };
        f.write_str(name)
    }
}

/// Inputs of the capture mode state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeEvent {
    /// A user was selected. `already_subscribed` is set when it is the user
    /// currently subscribed to.
    Select {
        /// Selection targets the current subscription
        already_subscribed: bool,
    },
    /// The selection was cleared
    Deselect,
    /// The subscribed stream was torn down remotely
    StreamEnded,
    /// Freeze or resume
    ToggleFreeze,
    /// Move playback
    Scrub,
    /// Save the recording
    Export,
    /// Leave the session
    Disconnect,
}

impl ModeKind {
    /// Successor of `self` on `event`
    pub fn next(self, event: ModeEvent) -> ModeKind {
        use ModeEvent::*;
        use ModeKind::*;

        match (self, event) {
            (_, Disconnect) | (_, Deselect) | (_, StreamEnded) => Idle,

            (Idle, Select { .. }) => Live,
            (Live, Select { .. }) => Live,
            (Frozen, Select { already_subscribed: true }) => Frozen,
            (Frozen, Select { already_subscribed: false }) => Live,

            (Live, ToggleFreeze) => Frozen,
            (Frozen, ToggleFreeze) => Live,
            (Idle, ToggleFreeze) => Idle,

            (mode, Scrub) | (mode, Export) => mode,
        }
    }

    /// Whether a stream is subscribed
    pub fn is_subscribed(self) -> bool {
        self != ModeKind::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [ModeKind; 3] = [ModeKind::Idle, ModeKind::Live, ModeKind::Frozen];
    const ALL_EVENTS: [ModeEvent; 8] = [
        ModeEvent::Select {
            already_subscribed: false,
        },
        ModeEvent::Select {
            already_subscribed: true,
        },
        ModeEvent::Deselect,
        ModeEvent::StreamEnded,
        ModeEvent::ToggleFreeze,
        ModeEvent::Scrub,
        ModeEvent::Export,
        ModeEvent::Disconnect,
    ];

    #[test]
    fn test_freeze_round_trip() {
        let live = ModeKind::Idle.next(ModeEvent::Select {
            already_subscribed: false,
        });
        assert_eq!(live, ModeKind::Live);
        let frozen = live.next(ModeEvent::ToggleFreeze);
        assert_eq!(frozen, ModeKind::Frozen);
        assert_eq!(frozen.next(ModeEvent::ToggleFreeze), ModeKind::Live);
    }

    #[test]
    fn test_disconnect_always_idle() {
        for mode in ALL_MODES {
            assert_eq!(mode.next(ModeEvent::Disconnect), ModeKind::Idle);
            assert_eq!(mode.next(ModeEvent::StreamEnded), ModeKind::Idle);
        }
    }

    #[test]
    fn test_scrub_and_export_keep_mode() {
        for mode in ALL_MODES {
            assert_eq!(mode.next(ModeEvent::Scrub), mode);
            assert_eq!(mode.next(ModeEvent::Export), mode);
        }
    }

    #[test]
    fn test_idle_only_leaves_on_select() {
        for event in ALL_EVENTS {
            let next = ModeKind::Idle.next(event);
            match event {
                ModeEvent::Select { .. } => assert_eq!(next, ModeKind::Live),
                _ => assert_eq!(next, ModeKind::Idle),
            }
        }
    }

    #[test]
    fn test_switching_user_while_frozen_goes_live() {
        assert_eq!(
            ModeKind::Frozen.next(ModeEvent::Select {
                already_subscribed: false
            }),
            ModeKind::Live
        );
        assert!(ModeKind::Frozen.is_subscribed());
        assert!(!ModeKind::Idle.is_subscribed());
    }
}
