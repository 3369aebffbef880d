/// Call lifecycle tracking across redundant start/end signalling.
///
/// The radio re-sends call start for late entry and repeats call end at the
/// tail of every transmission. The tracker folds those repeats into exactly
/// one start and one end notification per call.
///
/// [`CallState`] is shared between the hook context and whatever reads it
/// for display, so it lives behind a critical-section mutex and is only ever
/// copied in or out as a whole.
use core::cell::Cell;

use critical_section::Mutex;
use serde::Serialize;

use crate::address::Address;

/// Tracker phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    InCall,
}

/// Externally visible call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallState {
    pub in_call: bool,
    /// Source of the call most recently started
    pub last_src: Address,
    /// Destination of the call most recently started
    pub last_dst: Address,
}

impl CallState {
    pub const fn new() -> Self {
        Self {
            in_call: false,
            last_src: Address::ZERO,
            last_dst: Address::ZERO,
        }
    }

    pub const fn phase(&self) -> CallPhase {
        if self.in_call {
            CallPhase::InCall
        } else {
            CallPhase::Idle
        }
    }

    /// Pure transition function. Returns the next state and the
    /// notification to emit, if any.
    pub fn apply(self, signal: CallSignal) -> (CallState, Option<CallEvent>) {
        match (self.phase(), signal) {
            (CallPhase::Idle, CallSignal::Start { src, dst }) => (
                CallState {
                    in_call: true,
                    last_src: src,
                    last_dst: dst,
                },
                Some(CallEvent::Started { src, dst }),
            ),
            (CallPhase::InCall, CallSignal::End { src, dst }) => (
                CallState {
                    in_call: false,
                    ..self
                },
                Some(CallEvent::Ended { src, dst }),
            ),
            // Late-entry start repeats and tail end repeats.
            (CallPhase::InCall, CallSignal::Start { .. }) | (CallPhase::Idle, CallSignal::End { .. }) => {
                (self, None)
            }
        }
    }
}

impl Default for CallState {
    fn default() -> Self {
        Self::new()
    }
}

/// Call signalling seen on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSignal {
    Start { src: Address, dst: Address },
    End { src: Address, dst: Address },
}

/// Notification emitted on a real call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    Started { src: Address, dst: Address },
    Ended { src: Address, dst: Address },
}

/// Process-wide call state guarded by a critical section.
///
/// Usable as a `static`. The lock is held only for the copy-apply-store of
/// the state triple; callers log after it is released.
pub struct CallTracker {
    state: Mutex<Cell<CallState>>,
}

impl CallTracker {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(CallState::new())),
        }
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> CallState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    pub fn phase(&self) -> CallPhase {
        self.snapshot().phase()
    }

    /// Feed one signal through the state machine.
    pub fn signal(&self, signal: CallSignal) -> Option<CallEvent> {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let (next, event) = cell.get().apply(signal);
            cell.set(next);
            event
        })
    }

    pub fn start(&self, src: Address, dst: Address) -> Option<CallEvent> {
        self.signal(CallSignal::Start { src, dst })
    }

    pub fn end(&self, src: Address, dst: Address) -> Option<CallEvent> {
        self.signal(CallSignal::End { src, dst })
    }
}

impl Default for CallTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(v: u32) -> Address {
        Address::new(v).unwrap()
    }

    // ── Pure transitions ────────────────────────────────────────────

    #[test]
    fn initial_state_is_idle_and_zeroed() {
        let state = CallState::new();
        assert_eq!(state.phase(), CallPhase::Idle);
        assert_eq!(state.last_src, Address::ZERO);
        assert_eq!(state.last_dst, Address::ZERO);
    }

    #[test]
    fn start_from_idle_records_addresses() {
        let (next, event) = CallState::new().apply(CallSignal::Start {
            src: addr(100),
            dst: addr(200),
        });
        assert!(next.in_call);
        assert_eq!(next.last_src, addr(100));
        assert_eq!(next.last_dst, addr(200));
        assert_eq!(
            event,
            Some(CallEvent::Started {
                src: addr(100),
                dst: addr(200)
            })
        );
    }

    #[test]
    fn start_while_in_call_changes_nothing() {
        let (in_call, _) = CallState::new().apply(CallSignal::Start {
            src: addr(100),
            dst: addr(200),
        });
        let (next, event) = in_call.apply(CallSignal::Start {
            src: addr(300),
            dst: addr(400),
        });
        assert_eq!(next, in_call);
        assert_eq!(event, None);
    }

    #[test]
    fn end_while_idle_is_noop() {
        let idle = CallState::new();
        let (next, event) = idle.apply(CallSignal::End {
            src: addr(1),
            dst: addr(2),
        });
        assert_eq!(next, idle);
        assert_eq!(event, None);
    }

    // ── Tracker ─────────────────────────────────────────────────────

    #[test]
    fn repeated_starts_emit_one_notification() {
        let tracker = CallTracker::new();
        let started = (0..3)
            .filter_map(|_| tracker.start(addr(100), addr(200)))
            .count();
        assert_eq!(started, 1);
        assert_eq!(tracker.phase(), CallPhase::InCall);
    }

    #[test]
    fn repeated_ends_emit_one_notification() {
        let tracker = CallTracker::new();
        tracker.start(addr(100), addr(200));
        let ended: Vec<_> = (0..3)
            .filter_map(|_| tracker.end(addr(100), addr(200)))
            .collect();
        assert_eq!(
            ended,
            [CallEvent::Ended {
                src: addr(100),
                dst: addr(200)
            }]
        );
        assert_eq!(tracker.phase(), CallPhase::Idle);
    }

    #[test]
    fn start_start_end_end_scenario() {
        let tracker = CallTracker::new();
        let events: Vec<_> = [
            CallSignal::Start { src: addr(100), dst: addr(200) },
            CallSignal::Start { src: addr(100), dst: addr(200) },
            CallSignal::End { src: addr(100), dst: addr(200) },
            CallSignal::End { src: addr(100), dst: addr(200) },
        ]
        .into_iter()
        .filter_map(|s| tracker.signal(s))
        .collect();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CallEvent::Started { .. }));
        assert!(matches!(events[1], CallEvent::Ended { .. }));

        let state = tracker.snapshot();
        assert!(!state.in_call);
        assert_eq!(state.last_src, addr(100));
        assert_eq!(state.last_dst, addr(200));
    }

    #[test]
    fn consecutive_calls_each_notify() {
        let tracker = CallTracker::new();
        assert!(tracker.start(addr(1), addr(9)).is_some());
        assert!(tracker.end(addr(1), addr(9)).is_some());
        assert!(tracker.start(addr(2), addr(9)).is_some());
        assert_eq!(tracker.snapshot().last_src, addr(2));
    }

    #[test]
    fn snapshot_never_pairs_new_src_with_stale_dst() {
        use std::sync::Arc;
        use std::thread;

        let tracker = Arc::new(CallTracker::new());
        let writer = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for i in 1..2000u32 {
                    tracker.start(addr(i), addr(i + 1_000_000));
                    tracker.end(addr(i), addr(i + 1_000_000));
                }
            })
        };

        for _ in 0..2000 {
            let state = tracker.snapshot();
            if state.last_src != Address::ZERO {
                assert_eq!(state.last_dst.value(), state.last_src.value() + 1_000_000);
            }
        }
        writer.join().unwrap();
    }
}
