//! Monitor-mode squelch override.
//!
//! The radio posts a one-byte squelch mode for every incoming call: muted
//! when the call is not for a selected talkgroup or contact. In monitor
//! (promiscuous) mode a muted call is forced audible.

/// Mode byte for a muted call.
pub const MODE_MUTED: u8 = 0x08;

/// Mode byte for an audible call.
pub const MODE_UNMUTED: u8 = 0x09;

/// Which squelch path delivered the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    /// Group (talkgroup) call
    Group,
    /// Private (unit-to-unit) call
    Private,
}

impl CallClass {
    /// Wording used in the override log line.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallClass::Group => "public",
            CallClass::Private => "private",
        }
    }
}

/// One squelch decision request, built per hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquelchRequest {
    pub muted: bool,
    pub class: CallClass,
}

impl SquelchRequest {
    /// Build a request from the radio's mode byte.
    pub const fn from_mode(mode: u8, class: CallClass) -> Self {
        Self {
            muted: mode == MODE_MUTED,
            class,
        }
    }
}

/// True iff a muted call must be forced audible.
///
/// The call class does not affect the outcome. When this returns true the
/// caller runs the radio's pre-squelch preparation before rewriting the mode.
pub const fn should_force_unmute(req: SquelchRequest, monitor_enabled: bool) -> bool {
    req.muted && monitor_enabled
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_MUTED: SquelchRequest = SquelchRequest {
        muted: true,
        class: CallClass::Group,
    };

    #[test]
    fn muted_call_in_monitor_mode_is_forced() {
        assert!(should_force_unmute(GROUP_MUTED, true));
    }

    #[test]
    fn unmuted_call_is_left_alone() {
        let req = SquelchRequest {
            muted: false,
            class: CallClass::Group,
        };
        assert!(!should_force_unmute(req, true));
    }

    #[test]
    fn monitor_off_never_forces() {
        assert!(!should_force_unmute(GROUP_MUTED, false));
    }

    #[test]
    fn call_class_does_not_change_decision() {
        for monitor in [false, true] {
            for muted in [false, true] {
                let group = SquelchRequest { muted, class: CallClass::Group };
                let private = SquelchRequest { muted, class: CallClass::Private };
                assert_eq!(
                    should_force_unmute(group, monitor),
                    should_force_unmute(private, monitor)
                );
            }
        }
    }

    #[test]
    fn request_from_mode_byte() {
        assert!(SquelchRequest::from_mode(MODE_MUTED, CallClass::Group).muted);
        assert!(!SquelchRequest::from_mode(MODE_UNMUTED, CallClass::Group).muted);
        // Anything other than the muted byte counts as audible.
        assert!(!SquelchRequest::from_mode(0x00, CallClass::Private).muted);
    }

    #[test]
    fn class_wording() {
        assert_eq!(CallClass::Group.as_str(), "public");
        assert_eq!(CallClass::Private.as_str(), "private");
    }
}
