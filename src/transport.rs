//! Serial transport layer.
//!
//! Presents the bootloader's serial line as an opaque byte stream: blocking
//! writes, and reads that stop at a caller-supplied delimiter or a per-byte
//! inactivity timeout. SLIP escaping is entirely the `slip` module's concern;
//! this layer just moves bytes.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::error::{Result, UpdateError};

const BAUD_RATE: u32 = 115_200;
const PER_BYTE_TIMEOUT: Duration = Duration::from_secs(1);

/// Abstraction over the serial byte stream, so the DFU engine can be driven
/// by a scripted fake in tests as well as a real port.
pub trait Transport {
    /// Write all of `data`; fails on a short or errored write.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read one byte at a time into `buf` until `delimiter` is seen (not
    /// included in the returned count) or `buf` is full. A full second of
    /// inactivity between bytes is a `TransportIo` error.
    fn receive_until(&mut self, buf: &mut [u8], delimiter: u8) -> Result<usize>;
}

/// A real serial port, opened at 8N1/115200 with hardware flow control.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path`, configure it for DFU, and take an advisory exclusive lock.
    pub fn open(path: &str) -> Result<Self> {
        #[cfg(unix)]
        {
            Self::open_unix(path)
        }

        #[cfg(not(unix))]
        {
            Self::open_portable(path)
        }
    }

    #[cfg(unix)]
    fn open_unix(path: &str) -> Result<Self> {
        use std::os::unix::io::AsRawFd;

        let mut tty = serialport::new(path, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::Hardware)
            .timeout(PER_BYTE_TIMEOUT)
            .open_native()
            .map_err(|source| UpdateError::TransportOpen {
                path: path.to_string(),
                source,
            })?;

        let fd = tty.as_raw_fd();

        // Advisory exclusive lock: fail immediately if another process holds it.
        if unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) } != 0 {
            return Err(UpdateError::TransportOpen {
                path: path.to_string(),
                source: serialport::Error::new(
                    serialport::ErrorKind::Io(std::io::ErrorKind::WouldBlock),
                    "device is already in use (failed to acquire exclusive lock)",
                ),
            });
        }

        // Raw mode: no canonical processing, no echo, no signal generation,
        // blocking single-byte reads (VMIN=1, VTIME=0).
        unsafe {
            let mut attrs: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut attrs) != 0 {
                return Err(UpdateError::TransportIo(std::io::Error::last_os_error()));
            }
            attrs.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
            attrs.c_cc[libc::VMIN] = 1;
            attrs.c_cc[libc::VTIME] = 0;
            if libc::tcsetattr(fd, libc::TCSANOW, &attrs) != 0 {
                return Err(UpdateError::TransportIo(std::io::Error::last_os_error()));
            }
            if libc::tcflush(fd, libc::TCIFLUSH) != 0 {
                return Err(UpdateError::TransportIo(std::io::Error::last_os_error()));
            }
        }

        // Re-apply the timeout; some platforms reset it when the line
        // discipline is reconfigured above.
        tty.set_timeout(PER_BYTE_TIMEOUT)
            .map_err(|source| UpdateError::TransportOpen {
                path: path.to_string(),
                source,
            })?;

        Ok(Self {
            port: Box::new(tty),
        })
    }

    #[cfg(not(unix))]
    fn open_portable(path: &str) -> Result<Self> {
        let port = serialport::new(path, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::Hardware)
            .timeout(PER_BYTE_TIMEOUT)
            .open()
            .map_err(|source| UpdateError::TransportOpen {
                path: path.to_string(),
                source,
            })?;

        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn receive_until(&mut self, buf: &mut [u8], delimiter: u8) -> Result<usize> {
        let mut n = 0;
        let mut byte = [0u8; 1];

        while n < buf.len() {
            match self.port.read(&mut byte) {
                Ok(0) => {
                    return Err(UpdateError::TransportIo(std::io::Error::new(
                        ErrorKind::TimedOut,
                        "no byte received within the per-byte timeout",
                    )))
                }
                Ok(_) => {
                    if byte[0] == delimiter {
                        return Ok(n);
                    }
                    buf[n] = byte[0];
                    n += 1;
                }
                Err(e) => return Err(UpdateError::TransportIo(e)),
            }
        }

        Ok(n)
    }
}

/// An in-memory fake transport for exercising the DFU engine without a real
/// bootloader. Each test scripts the exact outbound frames it expects and
/// the exact inbound frames it should hand back. Shared by this module's and
/// the protocol module's tests, in place of a generic mocking-framework
/// dependency for what is only a three-method trait.
#[cfg(test)]
pub mod mock {
    use super::{ErrorKind, Result, Transport, UpdateError};
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct MockTransport {
        pub sent: Vec<Vec<u8>>,
        pub inbound: VecDeque<Vec<u8>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&mut self, frame: Vec<u8>) {
            self.inbound.push_back(frame);
        }
    }

    impl Transport for MockTransport {
        fn send(&mut self, data: &[u8]) -> Result<()> {
            self.sent.push(data.to_vec());
            Ok(())
        }

        fn receive_until(&mut self, buf: &mut [u8], delimiter: u8) -> Result<usize> {
            let mut frame = self.inbound.pop_front().ok_or_else(|| {
                UpdateError::TransportIo(std::io::Error::new(
                    ErrorKind::TimedOut,
                    "no scripted response left",
                ))
            })?;
            if frame.last() == Some(&delimiter) {
                frame.pop();
            }
            let n = frame.len().min(buf.len());
            buf[..n].copy_from_slice(&frame[..n]);
            Ok(n)
        }
    }
}
