//! dmrhook-md380 — static library linked into the patched MD380 image
//!
//! The C build links `libdmrhook_md380.a` and resolves the `*_hook` and
//! `dmrhook_*` symbols from it. The vendor routines the hooks forward to
//! (`dmr_call_start`, `md380_OSMboxPost`, `printf`, ...) stay undefined here
//! and are supplied by the firmware linker script.

#![no_std]

pub use dmrhook::firmware::*;

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    cortex_m::asm::udf()
}
