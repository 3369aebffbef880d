/// DMR Full Link Control and Short Link Control header decoding.
///
/// Every frame handed to the hooks starts with two bytes of baseband
/// (C5000) overhead; the second overhead byte carries the slot data type in
/// its high nibble. Headers follow at offset [`OVERHEAD`].
///
/// Decoders take the whole frame, check its length once, then read fixed
/// offsets. They never allocate and never read past the slice.
use core::fmt;

use crate::address::Address;
use crate::codes::{DataType, Flco, Sap};

/// Bytes of baseband overhead preceding every header.
pub const OVERHEAD: usize = 2;

/// Full LC payload: FLCO, FID, service options, dst triplet, src triplet.
pub const FULL_LC_PAYLOAD: usize = 9;

/// Minimum frame length for a Full LC decode.
pub const FULL_LC_LEN: usize = OVERHEAD + FULL_LC_PAYLOAD;

/// Short header: SAP/AB2 byte, second header byte, dst, src, port byte.
pub const SHORT_HEADER_PAYLOAD: usize = 9;

/// Minimum frame length for a Short LC header decode.
pub const SHORT_HEADER_LEN: usize = OVERHEAD + SHORT_HEADER_PAYLOAD;

/// Frame length of a call start/end or SMS header as delivered by the radio
/// (12-byte block plus overhead).
pub const BLOCK_FRAME_LEN: usize = 12 + OVERHEAD;

/// The frame was shorter than the header it should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated {
    pub needed: usize,
    pub got: usize,
}

impl fmt::Display for Truncated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truncated frame: need {} bytes, got {}", self.needed, self.got)
    }
}

/// Borrow the first `N` bytes of a frame as a fixed array.
fn fixed<const N: usize>(frame: &[u8]) -> Result<&[u8; N], Truncated> {
    frame
        .get(..N)
        .and_then(|head| head.try_into().ok())
        .ok_or(Truncated {
            needed: N,
            got: frame.len(),
        })
}

/// Slot data type from the overhead bytes.
pub fn data_type(frame: &[u8]) -> Result<DataType, Truncated> {
    let head = fixed::<OVERHEAD>(frame)?;
    Ok(DataType::from_overhead(head[1]))
}

// ── Full Link Control ──────────────────────────────────────────────────

/// Decoded Full Link Control PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkControl {
    pub flco: Flco,
    /// Feature set ID (vendor)
    pub fid: u8,
    pub service_options: u8,
    pub dst: Address,
    pub src: Address,
}

/// Decode the Full LC PDU that follows the overhead.
///
/// ```text
/// offset  2        3    4         5..8        8..11
///         PF|FLCO  FID  SVC_OPTS  dst hi..lo  src hi..lo
/// ```
pub fn decode_full_lc(frame: &[u8]) -> Result<LinkControl, Truncated> {
    let f = fixed::<FULL_LC_LEN>(frame)?;
    Ok(LinkControl {
        flco: Flco::from_byte(f[2]),
        fid: f[3],
        service_options: f[4],
        dst: Address::decode(f[5], f[6], f[7]),
        src: Address::decode(f[8], f[9], f[10]),
    })
}

impl fmt::Display for LinkControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "flco={} {} fid={} svc={} src={} dst={}",
            self.flco.code(),
            self.flco.as_str(),
            self.fid,
            self.service_options,
            self.src,
            self.dst
        )
    }
}

// ── Call signalling addresses ──────────────────────────────────────────

/// Source and destination carried by a call start or call end frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallAddresses {
    pub src: Address,
    pub dst: Address,
}

/// Extract the call addresses from a call start/end frame.
///
/// ```text
///                 /--dst-\ /--src-\
/// 08 2a 00 00 00 00 00 63 30 05 54 7c 2c 36
/// ```
///
/// Read straight from the big-endian triplets at offsets 5..8 and 8..11,
/// without going through the LC decode.
pub fn call_addresses(frame: &[u8]) -> Result<CallAddresses, Truncated> {
    let f = fixed::<11>(frame)?;
    Ok(CallAddresses {
        dst: Address::decode(f[5], f[6], f[7]),
        src: Address::decode(f[8], f[9], f[10]),
    })
}

// ── Short Link Control header ──────────────────────────────────────────

/// Decoded data / short message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortHeader {
    /// Service access point. Unlisted codes are kept raw.
    pub sap: Sap,
    /// Reserved nibble sharing the SAP byte.
    pub ab2: u8,
    /// Second header byte, not decoded further.
    pub flags: u8,
    pub dst: Address,
    pub src: Address,
    /// Source port (3 bits)
    pub sp: u8,
    /// Destination port (3 bits)
    pub dp: u8,
    /// S and F flags (2 bits)
    pub sf: u8,
}

/// Decode the data / SMS header that follows the overhead.
///
/// Fields are packed in over-the-air order, most significant field first:
///
/// ```text
/// offset 2:   7..4 sap   3..0 ab2
/// offset 3:   flags
/// offset 4..7:  dst hi..lo
/// offset 7..10: src hi..lo
/// offset 10:  7..5 sp   4..2 dp   1..0 sf
/// ```
///
/// The port byte split is provisional: it has only been checked against a
/// handful of captured short message headers.
pub fn decode_short_lc_header(frame: &[u8]) -> Result<ShortHeader, Truncated> {
    let f = fixed::<SHORT_HEADER_LEN>(frame)?;
    let ports = f[10];
    Ok(ShortHeader {
        sap: Sap::from_code(f[2] >> 4),
        ab2: f[2] & 0x0F,
        flags: f[3],
        dst: Address::decode(f[4], f[5], f[6]),
        src: Address::decode(f[7], f[8], f[9]),
        sp: ports >> 5,
        dp: (ports >> 2) & 0x07,
        sf: ports & 0x03,
    })
}

impl fmt::Display for ShortHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sap={} {} src={} dst={} sp={} dp={}",
            self.sap.code(),
            self.sap.as_str(),
            self.src,
            self.dst,
            self.sp,
            self.dp
        )
    }
}

// ── Hex dump ───────────────────────────────────────────────────────────

/// Space-separated lowercase hex rendering of a frame, for log lines.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
