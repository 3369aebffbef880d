//! dmrhook — portable DMR header decoding and call tracking for radio firmware hooks.
//!
//! The radio's baseband stack hands received frames to a handful of hooked
//! call-handling routines. This crate contains everything those hooks do with
//! the frame before handing it back: link control decoding, call start/end
//! deduplication, the monitor-mode squelch override, and logging. It has no
//! platform dependencies and is testable on any host with `cargo test`.
//! Platform consumers (the linked firmware surface, the `dmr-replay` host tool)
//! only provide the original handlers and the log sink.
//!
//! The library is organized in two layers:
//! - **Core**: `address`, `codes`, `header`, `call`, `squelch`, `config`,
//!   `dispatch`, `protocol` — `no_std`, no allocator.
//! - **Firmware** (feature `firmware`): `extern "C"` hook entry points and a
//!   `printf`-backed logger for linking into the patched radio image.

#![cfg_attr(not(test), no_std)]

pub mod address;
pub mod call;
pub mod codes;
pub mod config;
pub mod dispatch;
pub mod header;
pub mod protocol;
pub mod squelch;

#[cfg(feature = "firmware")]
pub mod firmware;
