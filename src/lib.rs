//! Host-side DFU updater for Nordic nRF5 Secure Bootloader targets.
//!
//! Speaks the bootloader's object-based DFU protocol over a SLIP-framed
//! serial line: ping, negotiate packet-receipt-notifications and MTU, then
//! stream an init-packet and a firmware image as DFU objects, verifying each
//! by CRC and offset before asking the device to execute it.

pub mod codec;
pub mod error;
pub mod logger;
pub mod protocol;
pub mod slip;
pub mod transport;

use std::path::Path;

pub use error::{Result, UpdateError};
pub use logger::LogLevel;

use logger::SessionLog;
use protocol::Session;
use transport::SerialTransport;

/// Packet-receipt-notification interval used for the whole session. Zero
/// disables intermediate receipt notifications; USB/UART is reliable enough
/// that WRITE_OBJECT bursts only need the trailing GET_CRC checkpoint.
const RECEIPT_NOTIFY_N: u16 = 0;

/// Run a full update against `device`: ping, negotiate, then stream
/// `init_packet_path` followed by `firmware_path`.
///
/// Fails fast on the first error and always leaves the transport closed
/// (dropping `SerialTransport` releases the underlying file handle and its
/// advisory lock).
pub fn update(
    device: &str,
    init_packet_path: &Path,
    firmware_path: &Path,
    log_level: LogLevel,
) -> Result<()> {
    let log = SessionLog::new(log_level);

    log.info(&format!("opening {device}..."));
    let transport = SerialTransport::open(device).map_err(|e| {
        log.error(&format!("Failed to open {device}: {e}"));
        e
    })?;
    log.info("[OK]");

    let mut session = Session::new(transport, log);
    session.run(init_packet_path, firmware_path, RECEIPT_NOTIFY_N)
}
