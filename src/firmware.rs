//! Linked firmware surface.
//!
//! The patched radio image branches into the `#[no_mangle]` hooks below in
//! place of its own call-handling routines. Each hook builds a dispatcher
//! over the shared tracker and the current configuration, and the
//! [`Md380`] stack forwards to the original routines linked from the
//! vendor image.
//!
//! Hooks run in the baseband task, next to interrupt context: no blocking,
//! no allocation.

use core::ffi::{c_char, c_int, c_void};
use core::fmt::Write;

// Links the single-core critical-section implementation.
use cortex_m as _;
use heapless::String;

use crate::call::{CallState, CallTracker};
use crate::config;
use crate::dispatch::{Dispatcher, RadioStack};
use crate::header::BLOCK_FRAME_LEN;
use crate::squelch::CallClass;

// Original routines in the vendor image. Symbols are provided by the
// firmware linker script.
unsafe extern "C" {
    fn dmr_call_start(pkt: *mut u8) -> *mut c_void;
    fn dmr_call_end(pkt: *mut u8) -> *mut c_void;
    fn dmr_handle_data(pkt: *mut u8, len: c_int) -> *mut c_void;
    fn dmr_sms_arrive(pkt: *mut c_void) -> *mut c_void;
    fn dmr_before_squelch();
    fn md380_OSMboxPost(event: *mut c_void, msg: *mut c_char);
    fn red_led(on: c_int);
    fn printf(fmt: *const c_char, ...) -> c_int;
}

/// Shared call state, read by the display task through [`dmrhook_call_state`].
pub static CALL_TRACKER: CallTracker = CallTracker::new();

/// Original routines of the MD380 firmware.
///
/// `event` is the audio task mailbox for the squelch hooks, null otherwise.
pub struct Md380 {
    event: *mut c_void,
}

impl Md380 {
    const fn frames() -> Self {
        Self {
            event: core::ptr::null_mut(),
        }
    }

    const fn squelch(event: *mut c_void) -> Self {
        Self { event }
    }
}

impl RadioStack for Md380 {
    type Reply = *mut c_void;
    const SENTINEL: *mut c_void = 0xdead_beef as *mut c_void;

    fn call_start(&mut self, frame: &mut [u8]) -> *mut c_void {
        unsafe { dmr_call_start(frame.as_mut_ptr()) }
    }

    fn call_end(&mut self, frame: &mut [u8]) -> *mut c_void {
        unsafe { dmr_call_end(frame.as_mut_ptr()) }
    }

    fn handle_data(&mut self, frame: &mut [u8], len: u32) -> *mut c_void {
        unsafe { dmr_handle_data(frame.as_mut_ptr(), len as c_int) }
    }

    fn sms_arrive(&mut self, frame: &mut [u8]) -> *mut c_void {
        unsafe { dmr_sms_arrive(frame.as_mut_ptr() as *mut c_void) }
    }

    fn before_squelch(&mut self) {
        unsafe { dmr_before_squelch() }
    }

    fn post_squelch(&mut self, mode: &mut u8) {
        // The mailbox carries the pointer, so post the caller's byte itself.
        unsafe { md380_OSMboxPost(self.event, mode as *mut u8 as *mut c_char) }
    }

    fn activity(&mut self) {
        unsafe { red_led(1) }
    }
}

fn dispatcher(stack: Md380) -> Dispatcher<'static, Md380> {
    Dispatcher::new(&CALL_TRACKER, config::get(), stack)
}

/// View a radio frame pointer as a slice. The slice is the only reference
/// to the buffer while the hook runs; the original routine gets it back
/// through [`RadioStack`].
///
/// # Safety
/// `pkt` must be valid for reads and writes of `len` bytes for the duration
/// of the hook.
unsafe fn frame<'a>(pkt: *mut u8, len: usize) -> &'a mut [u8] {
    if pkt.is_null() {
        &mut []
    } else {
        unsafe { core::slice::from_raw_parts_mut(pkt, len) }
    }
}

// ── Hook entry points ──────────────────────────────────────────────────

/// # Safety
/// Called by the radio with a 14-byte call start frame.
#[no_mangle]
pub unsafe extern "C" fn dmr_call_start_hook(pkt: *mut u8) -> *mut c_void {
    let pkt = unsafe { frame(pkt, BLOCK_FRAME_LEN) };
    dispatcher(Md380::frames()).call_start(pkt)
}

/// # Safety
/// Called by the radio with a 14-byte call end frame.
#[no_mangle]
pub unsafe extern "C" fn dmr_call_end_hook(pkt: *mut u8) -> *mut c_void {
    let pkt = unsafe { frame(pkt, BLOCK_FRAME_LEN) };
    dispatcher(Md380::frames()).call_end(pkt)
}

/// # Safety
/// `mode` must point at the squelch mode byte the radio is about to post.
#[no_mangle]
pub unsafe extern "C" fn dmr_apply_squelch_hook(event: *mut c_void, mode: *mut u8) {
    if let Some(mode) = unsafe { mode.as_mut() } {
        dispatcher(Md380::squelch(event)).apply_squelch(mode, CallClass::Group);
    }
}

/// # Safety
/// `mode` must point at the squelch mode byte the radio is about to post.
#[no_mangle]
pub unsafe extern "C" fn dmr_apply_privsquelch_hook(event: *mut c_void, mode: *mut u8) {
    if let Some(mode) = unsafe { mode.as_mut() } {
        dispatcher(Md380::squelch(event)).apply_squelch(mode, CallClass::Private);
    }
}

/// # Safety
/// `pkt` must hold `len` data bytes after the two overhead bytes.
#[no_mangle]
pub unsafe extern "C" fn dmr_handle_data_hook(pkt: *mut u8, len: c_int) -> *mut c_void {
    let data_len = len.max(0) as u32;
    let pkt = unsafe { frame(pkt, data_len as usize + crate::header::OVERHEAD) };
    dispatcher(Md380::frames()).handle_data(pkt, data_len)
}

/// # Safety
/// Called by the radio with a 14-byte short message header.
#[no_mangle]
pub unsafe extern "C" fn dmr_sms_arrive_hook(pkt: *mut c_void) -> *mut c_void {
    let pkt = unsafe { frame(pkt as *mut u8, BLOCK_FRAME_LEN) };
    dispatcher(Md380::frames()).sms_arrive(pkt)
}

// ── Configuration and state exports ────────────────────────────────────

/// Called by the settings menu when monitor mode is toggled.
#[no_mangle]
pub extern "C" fn dmrhook_set_monitor(on: c_int) {
    config::set_monitor(on != 0);
}

#[no_mangle]
pub extern "C" fn dmrhook_set_enabled(on: c_int) {
    config::set_enabled(on != 0);
}

/// Call state as laid out for the C display code.
#[repr(C)]
pub struct DmrCallState {
    pub in_call: c_int,
    pub src: u32,
    pub dst: u32,
}

impl From<CallState> for DmrCallState {
    fn from(state: CallState) -> Self {
        Self {
            in_call: state.in_call as c_int,
            src: state.last_src.value(),
            dst: state.last_dst.value(),
        }
    }
}

/// # Safety
/// `out` must be null or valid for a write of one `DmrCallState`.
#[no_mangle]
pub unsafe extern "C" fn dmrhook_call_state(out: *mut DmrCallState) {
    if let Some(out) = unsafe { out.as_mut() } {
        *out = CALL_TRACKER.snapshot().into();
    }
}

// ── printf logger ──────────────────────────────────────────────────────

/// Longest log line handed to printf; longer lines are cut.
const LINE_MAX: usize = 120;

struct PrintfLogger;

static LOGGER: PrintfLogger = PrintfLogger;

impl log::Log for PrintfLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let mut line: String<LINE_MAX> = String::new();
        // A line that doesn't fit is cut at the last whole chunk.
        let _ = write!(line, "{}", record.args());

        let mut cstr = [0u8; LINE_MAX + 2];
        let n = line.len();
        cstr[..n].copy_from_slice(line.as_bytes());
        cstr[n] = b'\n';
        unsafe {
            printf(c"%s".as_ptr(), cstr.as_ptr() as *const c_char);
        }
    }

    fn flush(&self) {}
}

/// Install the printf logger. Call once at boot, before the first hook runs.
#[no_mangle]
pub extern "C" fn dmrhook_init_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}
