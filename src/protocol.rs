/// JSON telemetry messages describing what the hooks saw.
///
/// Messages are newline-delimited JSON (NDJSON), serialized with
/// `serde-json-core` into fixed buffers for no_std/no-alloc operation.
use heapless::Vec;
use serde::Serialize;

use crate::address::Address;
use crate::call::{CallEvent, CallState};
use crate::header::ShortHeader;
use crate::squelch::CallClass;

/// Messages emitted by the hooks for display or host consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum HookMessage {
    /// A call began (first start signal seen while idle)
    #[serde(rename = "call_start")]
    CallStart { src: Address, dst: Address },
    /// A call ended (first end signal seen while in a call)
    #[serde(rename = "call_end")]
    CallEnd { src: Address, dst: Address },
    /// Data or short message header
    #[serde(rename = "short_header")]
    ShortHeader {
        /// Hook that saw the header: "data" or "sms"
        hook: &'static str,
        sap: u8,
        src: Address,
        dst: Address,
        sp: u8,
        dp: u8,
    },
    /// A muted call was forced audible by monitor mode
    #[serde(rename = "monitor")]
    Monitor {
        /// "public" or "private"
        class: &'static str,
    },
    /// Call state snapshot
    #[serde(rename = "status")]
    Status {
        in_call: bool,
        src: Address,
        dst: Address,
        /// Library version
        version: &'static str,
    },
}

impl HookMessage {
    pub fn from_call_event(event: CallEvent) -> Self {
        match event {
            CallEvent::Started { src, dst } => HookMessage::CallStart { src, dst },
            CallEvent::Ended { src, dst } => HookMessage::CallEnd { src, dst },
        }
    }

    pub fn from_short_header(hook: &'static str, hdr: &ShortHeader) -> Self {
        HookMessage::ShortHeader {
            hook,
            sap: hdr.sap.code(),
            src: hdr.src,
            dst: hdr.dst,
            sp: hdr.sp,
            dp: hdr.dp,
        }
    }

    pub fn monitor(class: CallClass) -> Self {
        HookMessage::Monitor {
            class: class.as_str(),
        }
    }

    pub fn status(state: &CallState) -> Self {
        HookMessage::Status {
            in_call: state.in_call,
            src: state.last_src,
            dst: state.last_dst,
            version: VERSION,
        }
    }
}

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 160;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Serialize a message to JSON followed by a newline.
/// Returns the number of bytes written, or None if it did not fit.
pub fn serialize_message(msg: &HookMessage, buf: &mut [u8]) -> Option<usize> {
    let len = serde_json_core::to_slice(msg, buf).ok()?;
    let newline = buf.get_mut(len)?;
    *newline = b'\n';
    Some(len + 1)
}

/// Serialize a message into an owned fixed-capacity buffer.
pub fn encode_message(msg: &HookMessage) -> Option<MsgBuffer> {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok()?;
    let len = serialize_message(msg, &mut buf)?;
    buf.truncate(len);
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(v: u32) -> Address {
        Address::new(v).unwrap()
    }

    fn to_json(msg: &HookMessage) -> std::string::String {
        let buf = encode_message(msg).unwrap();
        std::string::String::from_utf8(buf.to_vec()).unwrap()
    }

    // ── Call messages ───────────────────────────────────────────────

    #[test]
    fn serialize_call_start() {
        let msg = HookMessage::from_call_event(CallEvent::Started {
            src: addr(3_147_092),
            dst: addr(99),
        });
        assert_eq!(
            to_json(&msg),
            "{\"type\":\"call_start\",\"src\":3147092,\"dst\":99}\n"
        );
    }

    #[test]
    fn serialize_call_end() {
        let msg = HookMessage::from_call_event(CallEvent::Ended {
            src: addr(100),
            dst: addr(200),
        });
        let json = to_json(&msg);
        assert!(json.contains(r#""type":"call_end""#));
        assert!(json.contains(r#""src":100"#));
        assert!(json.contains(r#""dst":200"#));
    }

    // ── Header / monitor / status ───────────────────────────────────

    #[test]
    fn serialize_short_header() {
        let frame = [
            0x08, 0x6a, 0xA2, 0x40, 0x00, 0x00, 0x63, 0x30, 0x05, 0x54, 0x88, 0x00, 0x83, 0x0c,
        ];
        let hdr = crate::header::decode_short_lc_header(&frame).unwrap();
        let json = to_json(&HookMessage::from_short_header("sms", &hdr));
        assert!(json.contains(r#""type":"short_header""#));
        assert!(json.contains(r#""hook":"sms""#));
        assert!(json.contains(r#""sap":10"#));
        assert!(json.contains(r#""sp":4"#));
        assert!(json.contains(r#""dp":2"#));
    }

    #[test]
    fn serialize_monitor_wording() {
        let json = to_json(&HookMessage::monitor(CallClass::Private));
        assert_eq!(json, "{\"type\":\"monitor\",\"class\":\"private\"}\n");
    }

    #[test]
    fn serialize_status_snapshot() {
        let state = CallState {
            in_call: true,
            last_src: addr(100),
            last_dst: addr(200),
        };
        let json = to_json(&HookMessage::status(&state));
        assert!(json.contains(r#""type":"status""#));
        assert!(json.contains(r#""in_call":true"#));
        assert!(json.contains(r#""src":100"#));
        assert!(json.contains(&format!(r#""version":"{VERSION}""#)));
    }

    // ── Buffer handling ─────────────────────────────────────────────

    #[test]
    fn serialize_into_short_buffer_fails() {
        let msg = HookMessage::monitor(CallClass::Group);
        let mut buf = [0u8; 8];
        assert_eq!(serialize_message(&msg, &mut buf), None);
    }

    #[test]
    fn serialize_without_room_for_newline_fails() {
        let msg = HookMessage::monitor(CallClass::Group);
        let exact = r#"{"type":"monitor","class":"public"}"#.len();
        let mut buf = [0u8; 64];
        assert_eq!(serialize_message(&msg, &mut buf[..exact]), None);
        assert_eq!(serialize_message(&msg, &mut buf[..exact + 1]), Some(exact + 1));
    }

    #[test]
    fn version_matches_package() {
        let expected = format!(
            "{}.{}.{}",
            env!("CARGO_PKG_VERSION_MAJOR"),
            env!("CARGO_PKG_VERSION_MINOR"),
            env!("CARGO_PKG_VERSION_PATCH")
        );
        assert_eq!(VERSION, expected);
    }
}
