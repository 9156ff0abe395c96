//! Error types for the nRF5 DFU updater.
//!
//! One variant per error kind named in the design's error handling section,
//! each carrying the detail that used to go straight to the original's
//! `dfu_log(NRFU_LOG_LEVEL_ERROR, ...)` calls.

use thiserror::Error;

/// Result type alias for updater operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Everything that can cause a DFU session to fail.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The serial device could not be opened, configured, or locked.
    #[error("failed to open {path}: {source}")]
    TransportOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// A read or write on the transport failed, or a receive timed out.
    #[error("transport I/O error: {0}")]
    TransportIo(#[from] std::io::Error),

    /// Response frame shorter than 3 bytes.
    #[error("response frame too short: {len} byte(s)")]
    FramingShort { len: usize },

    /// Leading byte of the response was not the RESPONSE marker (0x60).
    #[error("response missing RESPONSE marker, got opcode 0x{got:02x}")]
    FramingOpcode { got: u8 },

    /// Echoed opcode in the response didn't match the opcode that was sent.
    #[error("opcode mismatch: sent 0x{sent:02x}, echoed 0x{echoed:02x}")]
    OpcodeMismatch { sent: u8, echoed: u8 },

    /// Device returned a non-success result code.
    #[error("device returned failure result code 0x{code:02x} for opcode 0x{opcode:02x}")]
    ResultFailure { opcode: u8, code: u8 },

    /// Response payload shorter than the structure it's supposed to carry.
    #[error("response payload too short: expected at least {expected} byte(s), got {got}")]
    PayloadShort { expected: usize, got: usize },

    /// Source file is larger than the object's reported `max_size`.
    #[error("file size {size} exceeds object max_size {max_size}")]
    SizeExceeded { size: u64, max_size: u32 },

    /// Device-reported CRC didn't match the host's running CRC after a stream.
    #[error("CRC mismatch: expected 0x{expected:08x}, device reported 0x{actual:08x}")]
    VerifyCrc { expected: u32, actual: u32 },

    /// Device-reported offset didn't match the host's cumulative transmitted bytes.
    #[error("offset mismatch: expected {expected}, device reported {actual}")]
    VerifyOffset { expected: u32, actual: u32 },

    /// A source file (init-packet or firmware) could not be opened, read, or seeked.
    #[error("file I/O error for {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The negotiated MTU is too small to carry even a single chunk byte.
    #[error("MTU {mtu} yields a non-positive chunk size")]
    InvalidMtu { mtu: u16 },

    /// The computed chunk size does not fit in the message buffer.
    #[error("chunk size {chunk_size} exceeds message buffer capacity {capacity}")]
    ChunkTooLarge { chunk_size: usize, capacity: usize },

    /// A SLIP-encoded frame contained an invalid or dangling escape sequence.
    #[error("invalid SLIP escape sequence")]
    SlipEscape,
}
