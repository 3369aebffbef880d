//! dmr-replay — run captured hook frames through the dmrhook dispatcher
//!
//! Reads a capture (file argument or stdin) of `<tag> <hex bytes>` lines and
//! feeds each frame to the same dispatcher the firmware hooks use, with a
//! counting stack standing in for the radio. Handy for checking decoder
//! field layouts against real over-the-air captures.
//!
//! Tags: `cs` call start, `ce` call end, `da` data block, `sm` SMS header,
//! `sq` / `pq` public / private squelch (one mode byte).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{anyhow, bail, Context, Result};

use dmrhook::call::CallTracker;
use dmrhook::config::HookConfig;
use dmrhook::dispatch::{Dispatcher, RadioStack};
use dmrhook::header::OVERHEAD;
use dmrhook::protocol::{self, HookMessage, VERSION};
use dmrhook::squelch::CallClass;

/// Longest frame accepted on a capture line
const MAX_FRAME: usize = 64;

type Frame = heapless::Vec<u8, MAX_FRAME>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    CallStart,
    CallEnd,
    Data,
    Sms,
    Squelch(CallClass),
}

impl Hook {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "cs" => Some(Hook::CallStart),
            "ce" => Some(Hook::CallEnd),
            "da" => Some(Hook::Data),
            "sm" => Some(Hook::Sms),
            "sq" => Some(Hook::Squelch(CallClass::Group)),
            "pq" => Some(Hook::Squelch(CallClass::Private)),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct CaptureLine {
    hook: Hook,
    frame: Frame,
}

/// Parse one capture line. Blank lines and `#` comments yield `None`.
fn parse_line(line: &str) -> Result<Option<CaptureLine>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let tag = tokens.next().unwrap_or_default();
    let hook = Hook::from_tag(tag).with_context(|| format!("unknown hook tag '{tag}'"))?;

    let mut frame = Frame::new();
    for tok in tokens {
        let byte = u8::from_str_radix(tok, 16).with_context(|| format!("bad hex byte '{tok}'"))?;
        frame
            .push(byte)
            .map_err(|_| anyhow!("frame longer than {MAX_FRAME} bytes"))?;
    }

    if matches!(hook, Hook::Squelch(_)) && frame.len() != 1 {
        bail!("squelch lines carry exactly one mode byte");
    }

    Ok(Some(CaptureLine { hook, frame }))
}

/// Stand-in for the radio's original handlers.
#[derive(Debug, Default)]
struct ReplayStack {
    forwards: u32,
    squelch_posts: u32,
    forced: u32,
    activity: u32,
}

impl ReplayStack {
    fn forward(&mut self, what: &str) -> u32 {
        self.forwards += 1;
        log::trace!("forward #{} to {}", self.forwards, what);
        self.forwards
    }
}

impl RadioStack for ReplayStack {
    type Reply = u32;
    const SENTINEL: u32 = 0xdead_beef;

    fn call_start(&mut self, _frame: &mut [u8]) -> u32 {
        self.forward("dmr_call_start")
    }

    fn call_end(&mut self, _frame: &mut [u8]) -> u32 {
        self.forward("dmr_call_end")
    }

    fn handle_data(&mut self, _frame: &mut [u8], _len: u32) -> u32 {
        self.forward("dmr_handle_data")
    }

    fn sms_arrive(&mut self, _frame: &mut [u8]) -> u32 {
        self.forward("dmr_sms_arrive")
    }

    fn before_squelch(&mut self) {
        self.forced += 1;
    }

    fn post_squelch(&mut self, mode: &mut u8) {
        self.squelch_posts += 1;
        log::trace!("squelch mode 0x{:02x} posted", mode);
    }

    fn activity(&mut self) {
        self.activity += 1;
    }
}

fn replay(dispatcher: &mut Dispatcher<'_, ReplayStack>, line: &mut CaptureLine) {
    let reply = match line.hook {
        Hook::CallStart => dispatcher.call_start(&mut line.frame),
        Hook::CallEnd => dispatcher.call_end(&mut line.frame),
        Hook::Data => {
            let len = line.frame.len().saturating_sub(OVERHEAD) as u32;
            dispatcher.handle_data(&mut line.frame, len)
        }
        Hook::Sms => dispatcher.sms_arrive(&mut line.frame),
        Hook::Squelch(class) => {
            if let Some(&byte) = line.frame.first() {
                let mut mode = byte;
                dispatcher.apply_squelch(&mut mode, class);
            }
            return;
        }
    };
    if reply == ReplayStack::SENTINEL {
        log::debug!("hooks disabled, original not called");
    }
}

#[derive(Debug, Default)]
struct Options {
    monitor: bool,
    disabled: bool,
    json: bool,
    verbosity: u8,
    path: Option<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options> {
    let mut opts = Options::default();
    for arg in args {
        match arg.as_str() {
            "-m" | "--monitor" => opts.monitor = true,
            "--disabled" => opts.disabled = true,
            "-j" | "--json" => opts.json = true,
            "-v" => opts.verbosity += 1,
            "-vv" => opts.verbosity += 2,
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            s if s.starts_with('-') => bail!("unknown option '{s}'"),
            path => {
                if opts.path.replace(path.to_string()).is_some() {
                    bail!("only one capture file may be given");
                }
            }
        }
    }
    Ok(opts)
}

fn print_usage() {
    println!("dmr-replay {VERSION}");
    println!("Usage: dmr-replay [-m|--monitor] [--disabled] [-j|--json] [-v] [CAPTURE]");
    println!();
    println!("Replays `<tag> <hex bytes>` lines (cs, ce, da, sm, sq, pq) through the");
    println!("hook dispatcher. Reads stdin when no capture file is given.");
}

fn write_json(out: &mut impl Write, msg: &HookMessage) -> Result<()> {
    let buf = protocol::encode_message(msg).context("message does not fit the buffer")?;
    out.write_all(&buf)?;
    Ok(())
}

fn main() -> Result<()> {
    let opts = parse_args(std::env::args().skip(1))?;

    env_logger::Builder::new()
        .filter_level(match opts.verbosity {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .format_timestamp(None)
        .init();

    let reader: Box<dyn BufRead> = match &opts.path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening capture {path}"))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let tracker = CallTracker::new();
    let config = HookConfig {
        enabled: !opts.disabled,
        monitor: opts.monitor,
    };
    let mut dispatcher = Dispatcher::new(&tracker, config, ReplayStack::default());
    let mut out = io::stdout().lock();
    let mut calls = 0u32;

    for (n, line) in reader.lines().enumerate() {
        let line = line.context("reading capture")?;
        let mut parsed = match parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("line {}: {:#}", n + 1, e);
                continue;
            }
        };

        replay(&mut dispatcher, &mut parsed);

        if let Some(msg) = dispatcher.last_message() {
            if matches!(msg, HookMessage::CallStart { .. }) {
                calls += 1;
            }
            if opts.json {
                write_json(&mut out, &msg)?;
            }
        }
    }

    let state = tracker.snapshot();
    if opts.json {
        write_json(&mut out, &HookMessage::status(&state))?;
    }

    let stack = dispatcher.into_stack();
    log::info!(
        "{} forwards, {} calls, {} squelch posts ({} forced), {} data frames, in_call={}",
        stack.forwards,
        calls,
        stack.squelch_posts,
        stack.forced,
        stack.activity,
        state.in_call
    );
    Ok(())
}
