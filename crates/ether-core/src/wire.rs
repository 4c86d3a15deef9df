//! Ether wire format — the transfer header that precedes every file.
//!
//! These types ARE the protocol. A session on the wire is:
//!
//! ```text
//! [ TransferHeader (12 bytes) ][ filename (name_length bytes) ][ payload (file_size bytes) ]
//! ```
//!
//! There is no version byte, checksum or acknowledgement. The payload ends when
//! exactly `file_size` bytes have been moved; correctness relies on TCP.
//!
//! The header is a `#[repr(C)]` struct of big-endian zerocopy integers, so its
//! in-memory bytes are its wire bytes. There is no unsafe code in this module.

use static_assertions::assert_eq_size;
use zerocopy::byteorder::{BigEndian, U32, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

// ── Transfer Header ──────────────────────────────────────────────────────────

/// Fixed-size preamble describing the filename and payload that follow.
///
/// Wire size: 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct TransferHeader {
    /// Byte length of the UTF-8 filename immediately following the header.
    pub name_length: U32<BigEndian>,

    /// Exact byte count of the payload following the filename.
    pub file_size: U64<BigEndian>,
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(TransferHeader, [u8; HEADER_LEN]);

impl TransferHeader {
    pub fn new(name_length: u32, file_size: u64) -> Self {
        Self {
            name_length: U32::new(name_length),
            file_size: U64::new(file_size),
        }
    }

    pub fn name_length(&self) -> u32 {
        self.name_length.get()
    }

    pub fn file_size(&self) -> u64 {
        self.file_size.get()
    }

    /// Serialize to the exact 12 wire bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Parse a header from the front of `bytes`. Trailing bytes are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, WireError> {
        Self::read_from_prefix(bytes).ok_or(WireError::MalformedHeader(bytes.len()))
    }
}

/// Encode a header into its 12 wire bytes.
pub fn encode(name_length: u32, file_size: u64) -> [u8; HEADER_LEN] {
    TransferHeader::new(name_length, file_size).to_bytes()
}

/// Decode `(name_length, file_size)` from the first 12 bytes of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<(u32, u64), WireError> {
    let header = TransferHeader::parse(bytes)?;
    Ok((header.name_length(), header.file_size()))
}

// ── Constants ─────────────────────────────────────────────────────────────────

/// Size of the transfer header on the wire.
pub const HEADER_LEN: usize = 12;

/// Default payload chunk size. Not part of the wire format.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default TCP port for a receiver.
pub const DEFAULT_PORT: u16 = 5001;

/// Largest filename a receiver will accept.
/// Guards the filename allocation against a hostile `name_length`.
pub const MAX_NAME_LEN: u32 = 4096;

/// Default connection probe timeout in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 3;

/// Default accept poll interval in milliseconds.
/// Bounds how long a waiting receiver takes to notice cancellation.
pub const ACCEPT_POLL_MILLIS: u64 = 1000;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("malformed header: expected {} bytes, got {0}", HEADER_LEN)]
    MalformedHeader(usize),

    #[error("filename length {0} exceeds maximum {}", MAX_NAME_LEN)]
    NameTooLong(u32),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
