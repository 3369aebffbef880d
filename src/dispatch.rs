/// Frame interception: the hook entry points.
///
/// Each entry point decodes and logs the frame, updates call tracking or
/// applies the squelch policy, then hands the (possibly modified) arguments
/// to the radio's original handler and returns its result unchanged.
/// Decode failures only cost a log line; the original handler always runs
/// unless the hooks are disabled, in which case the data hooks return the
/// stack's sentinel as a compiled-out hook would.
use crate::call::{CallEvent, CallTracker};
use crate::config::HookConfig;
use crate::header::{self, HexDump, BLOCK_FRAME_LEN, OVERHEAD};
use crate::protocol::HookMessage;
use crate::squelch::{should_force_unmute, CallClass, SquelchRequest, MODE_UNMUTED};

/// The radio firmware's original routines, as seen from the hooks.
///
/// The firmware implementation forwards to the linked vendor functions;
/// tests and the replay tool record what was forwarded.
pub trait RadioStack {
    /// What the original frame handlers return.
    type Reply;

    /// Returned by the data hooks when hooks are disabled.
    const SENTINEL: Self::Reply;

    // Frames are handed over mutably: the vendor routines own the buffer
    // and may rewrite it in place.
    fn call_start(&mut self, frame: &mut [u8]) -> Self::Reply;
    fn call_end(&mut self, frame: &mut [u8]) -> Self::Reply;
    fn handle_data(&mut self, frame: &mut [u8], len: u32) -> Self::Reply;
    fn sms_arrive(&mut self, frame: &mut [u8]) -> Self::Reply;

    /// Preparation the radio requires before a squelch mode is changed.
    fn before_squelch(&mut self);

    /// Post the squelch mode to the audio task.
    fn post_squelch(&mut self, mode: &mut u8);

    /// Data activity indicator (the red LED on the MD380).
    fn activity(&mut self) {}
}

/// Hook entry points bound to a call tracker, a configuration snapshot and
/// the original handlers.
pub struct Dispatcher<'a, S> {
    tracker: &'a CallTracker,
    config: HookConfig,
    stack: S,
    message: Option<HookMessage>,
}

impl<'a, S: RadioStack> Dispatcher<'a, S> {
    pub fn new(tracker: &'a CallTracker, config: HookConfig, stack: S) -> Self {
        Self {
            tracker,
            config,
            stack,
            message: None,
        }
    }

    pub fn config(&self) -> HookConfig {
        self.config
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn into_stack(self) -> S {
        self.stack
    }

    /// Telemetry message produced by the most recent entry point, if any.
    pub fn last_message(&self) -> Option<HookMessage> {
        self.message
    }

    // ── Call signalling ─────────────────────────────────────────────

    /// Call start (voice LC header). Re-sent several times per call for
    /// late entry; only the first one while idle starts a call.
    pub fn call_start(&mut self, frame: &mut [u8]) -> S::Reply {
        self.message = None;
        if self.config.enabled {
            log_link_control("cs", frame);
        }
        match header::call_addresses(frame) {
            Ok(addrs) => {
                if let Some(event) = self.tracker.start(addrs.src, addrs.dst) {
                    self.notify(event);
                }
            }
            Err(e) => log::warn!("cs: {}", e),
        }
        self.stack.call_start(frame)
    }

    /// Call end (terminator with LC). Repeated at the tail of a call; only
    /// the first one while in a call ends it.
    pub fn call_end(&mut self, frame: &mut [u8]) -> S::Reply {
        self.message = None;
        if self.config.enabled {
            log_link_control("ce", frame);
        }
        match header::call_addresses(frame) {
            Ok(addrs) => {
                if let Some(event) = self.tracker.end(addrs.src, addrs.dst) {
                    self.notify(event);
                }
            }
            Err(e) => log::warn!("ce: {}", e),
        }
        self.stack.call_end(frame)
    }

    fn notify(&mut self, event: CallEvent) {
        match event {
            CallEvent::Started { src, dst } => log::info!("Call from {} to {} started.", src, dst),
            CallEvent::Ended { src, dst } => log::info!("Call from {} to {} ended.", src, dst),
        }
        self.message = Some(HookMessage::from_call_event(event));
    }

    // ── Squelch ─────────────────────────────────────────────────────

    /// Squelch mode post for a group or private call. In monitor mode a
    /// muted mode byte is rewritten in place before it is posted.
    pub fn apply_squelch(&mut self, mode: &mut u8, class: CallClass) {
        self.message = None;
        if self.config.enabled {
            let req = SquelchRequest::from_mode(*mode, class);
            if should_force_unmute(req, self.config.monitor) {
                log::info!("Applying monitor mode to a {} call.", class.as_str());
                self.stack.before_squelch();
                *mode = MODE_UNMUTED;
                self.message = Some(HookMessage::monitor(class));
            }
        }
        self.stack.post_squelch(mode);
    }

    // ── Data ────────────────────────────────────────────────────────

    /// Data block. `len` excludes the two overhead bytes.
    pub fn handle_data(&mut self, frame: &mut [u8], len: u32) -> S::Reply {
        self.message = None;
        if !self.config.enabled {
            return S::SENTINEL;
        }
        self.log_short_header("da", "data", frame);
        self.stack.activity();

        let dump_len = (len as usize).saturating_add(OVERHEAD).min(frame.len());
        log::info!("Data:       {}", HexDump(&frame[..dump_len]));

        self.stack.handle_data(frame, len)
    }

    /// Short message header. The payload itself arrives later through
    /// [`Dispatcher::handle_data`].
    pub fn sms_arrive(&mut self, frame: &mut [u8]) -> S::Reply {
        self.message = None;
        if !self.config.enabled {
            return S::SENTINEL;
        }
        self.log_short_header("sm", "sms", frame);
        self.stack.activity();

        let dump_len = BLOCK_FRAME_LEN.min(frame.len());
        log::info!("SMS header: {}", HexDump(&frame[..dump_len]));

        self.stack.sms_arrive(frame)
    }

    fn log_short_header(&mut self, tag: &str, hook: &'static str, frame: &[u8]) {
        match header::decode_short_lc_header(frame) {
            Ok(hdr) => {
                log::info!("{}({})", tag, hdr);
                self.message = Some(HookMessage::from_short_header(hook, &hdr));
            }
            Err(e) => log::warn!("{}: {}", tag, e),
        }
    }
}

fn log_link_control(tag: &str, frame: &[u8]) {
    let data_type = match header::data_type(frame) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("{}: {}", tag, e);
            return;
        }
    };
    match header::decode_full_lc(frame) {
        Ok(lc) => log::info!("{} type={} {}", tag, data_type.code(), lc),
        Err(e) => log::warn!("{} type={}: {}", tag, data_type.code(), e),
    }
}
