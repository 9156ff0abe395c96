//! The DFU protocol engine.
//!
//! Drives a bootloader through ping, PRN, MTU negotiation, and the
//! object-based transfer state machine (select → create → stream → verify →
//! execute) for the init-packet and firmware objects. Every opcode, payload
//! layout, and ordering constraint here is load-bearing: it mirrors
//! `dfu_send_msg`/`dfu_get_response`/`stream_data`/`send_init_packet`/
//! `send_firmware` in the reference `libnrfu` implementation byte for byte.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::codec;
use crate::error::{Result, UpdateError};
use crate::logger::SessionLog;
use crate::slip;
use crate::transport::Transport;

const RESPONSE_MARKER: u8 = 0x60;
const RESCODE_SUCCESS: u8 = 0x01;

/// Message buffer size, mirroring the reference `struct dfu_msg_t`'s 128-byte
/// `data` union member.
const MSG_BUFFER_SIZE: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum OpCode {
    ObjectCreate = 0x01,
    SetPrn = 0x02,
    GetCrc = 0x03,
    SetExecute = 0x04,
    ObjectSelect = 0x06,
    GetMtu = 0x07,
    WriteObject = 0x08,
    Ping = 0x09,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum ObjectType {
    Command = 0x01,
    Data = 0x02,
}

impl ObjectType {
    fn label(self) -> &'static str {
        match self {
            ObjectType::Command => "COMMAND",
            ObjectType::Data => "DATA",
        }
    }
}

/// Named progress points, mirrored on the session purely for DEBUG-level
/// tracing; callers never observe this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Pinged,
    PrnSet,
    MtuKnown,
    SelectedCmd,
    CreatedCmd,
    StreamedCmd,
    VerifiedCmd,
    ExecutedCmd,
    SelectedData,
    CreatedData,
    StreamedData,
    VerifiedData,
    ExecutedData,
    Done,
}

impl Stage {
    fn label(self) -> &'static str {
        match self {
            Stage::Start => "START",
            Stage::Pinged => "PINGED",
            Stage::PrnSet => "PRN_SET",
            Stage::MtuKnown => "MTU_KNOWN",
            Stage::SelectedCmd => "SELECTED_CMD",
            Stage::CreatedCmd => "CREATED_CMD",
            Stage::StreamedCmd => "STREAMED_CMD",
            Stage::VerifiedCmd => "VERIFIED_CMD",
            Stage::ExecutedCmd => "EXECUTED_CMD",
            Stage::SelectedData => "SELECTED_DATA",
            Stage::CreatedData => "CREATED_DATA",
            Stage::StreamedData => "STREAMED_DATA",
            Stage::VerifiedData => "VERIFIED_DATA",
            Stage::ExecutedData => "EXECUTED_DATA",
            Stage::Done => "DONE",
        }
    }
}

struct ObjectSelectResponse {
    max_size: u32,
    offset: u32,
    crc: u32,
}

/// One DFU session bound to a transport. Owns the negotiated MTU and PRN,
/// and the running CRC that is carried across every object boundary.
pub struct Session<T: Transport> {
    transport: T,
    log: SessionLog,
    mtu: u16,
    prn: u16,
    stage: Stage,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, log: SessionLog) -> Self {
        Self {
            transport,
            log,
            mtu: 0,
            prn: 0,
            stage: Stage::Start,
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.log.debug(&format!("stage: {}", stage.label()));
    }

    /// Byte-stuff and send one command, logging the outbound bytes.
    fn send_command(&mut self, opcode: OpCode, payload: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(1 + payload.len());
        frame.push(opcode as u8);
        frame.extend_from_slice(payload);

        self.log.trace_bytes("-->", &frame);
        let encoded = slip::encode_frame(&frame);
        self.transport.send(&encoded)
    }

    /// Read one SLIP-delimited response frame and validate it against
    /// `opcode`, returning the payload bytes beyond the 3-byte header.
    fn receive_response(&mut self, opcode: OpCode) -> Result<Vec<u8>> {
        let mut raw = vec![0u8; MSG_BUFFER_SIZE];
        let n = self.transport.receive_until(&mut raw, slip::END)?;
        raw.truncate(n);
        let frame = slip::decode_frame(&raw)?;

        self.log.trace_bytes("<--", &frame);

        if frame.len() < 3 {
            self.log.error(&format!("Response too short: {}", frame.len()));
            return Err(UpdateError::FramingShort { len: frame.len() });
        }
        if frame[0] != RESPONSE_MARKER {
            self.log
                .error(&format!("No response: 0x{:02x}", frame[0]));
            return Err(UpdateError::FramingOpcode { got: frame[0] });
        }
        if frame[1] != opcode as u8 {
            self.log.error(&format!(
                "Unexpected OP_CODE: 0x{:02x} (expected 0x{:02x})",
                frame[1], opcode as u8
            ));
            return Err(UpdateError::OpcodeMismatch {
                sent: opcode as u8,
                echoed: frame[1],
            });
        }
        if frame[2] != RESCODE_SUCCESS {
            self.log.error(&format!(
                "Response Error! op_code 0x{:02x}, result code 0x{:02x}",
                opcode as u8, frame[2]
            ));
            return Err(UpdateError::ResultFailure {
                opcode: opcode as u8,
                code: frame[2],
            });
        }

        Ok(frame[3..].to_vec())
    }

    fn request(&mut self, opcode: OpCode, payload: &[u8]) -> Result<Vec<u8>> {
        self.send_command(opcode, payload)?;
        self.receive_response(opcode)
    }

    /// Send `{PING, 0x01}` and confirm the device answers with a PING response.
    fn ping(&mut self) -> Result<()> {
        self.log.info("Sending ping...");
        self.request(OpCode::Ping, &[0x01])?;
        self.log.info("[OK]");
        Ok(())
    }

    /// Configure the packet-receipt-notification interval.
    fn set_prn(&mut self, prn: u16) -> Result<()> {
        self.log.info(&format!("Setting receipt notify to {prn}..."));
        let mut buf = [0u8; 2];
        codec::u16_encode(prn, &mut buf);
        self.request(OpCode::SetPrn, &buf)?;
        self.prn = prn;
        self.log.info("[OK]");
        Ok(())
    }

    /// Query and record the negotiated MTU.
    fn get_mtu(&mut self) -> Result<()> {
        self.log.info("Getting MTU...");
        let payload = self.request(OpCode::GetMtu, &[])?;
        if payload.len() < 2 {
            self.log.error(&format!(
                "Response too short for MTU! Received: {} Expected: {}",
                payload.len(),
                2
            ));
            return Err(UpdateError::PayloadShort {
                expected: 2,
                got: payload.len(),
            });
        }
        self.mtu = codec::u16_decode_slice(&payload);
        self.log.info(&format!("[OK]: MTU is {}", self.mtu));
        Ok(())
    }

    /// Select an object type and parse its `(max_size, offset, crc)` state.
    fn select_object(&mut self, kind: ObjectType) -> Result<ObjectSelectResponse> {
        self.log.info(&format!("Selecting object type {}...", kind.label()));
        let payload = self.request(OpCode::ObjectSelect, &[kind as u8])?;
        if payload.len() < 12 {
            self.log.error(&format!(
                "Response too short for OBJ_SELECT! Received: {} Expected: {}",
                payload.len(),
                12
            ));
            return Err(UpdateError::PayloadShort {
                expected: 12,
                got: payload.len(),
            });
        }
        let resp = ObjectSelectResponse {
            max_size: codec::u32_decode_slice(&payload[0..4]),
            offset: codec::u32_decode_slice(&payload[4..8]),
            crc: codec::u32_decode_slice(&payload[8..12]),
        };
        self.log.info(&format!(
            "[OK]: [0x{:x}, 0x{:x}, 0x{:x}]",
            resp.max_size, resp.offset, resp.crc
        ));
        Ok(resp)
    }

    /// Create an object of `kind` and `size` bytes on the device.
    fn create_object(&mut self, kind: ObjectType, size: u32) -> Result<()> {
        self.log.info(&format!(
            "Creating object type {}, size 0x{:x}...",
            kind.label(),
            size
        ));
        let mut payload = vec![kind as u8];
        let mut size_buf = [0u8; 4];
        codec::u32_encode(size, &mut size_buf);
        payload.extend_from_slice(&size_buf);
        self.request(OpCode::ObjectCreate, &payload)?;
        self.log.info("[OK]");
        Ok(())
    }

    /// Fetch the device's running `(offset, crc)` for the object in progress.
    fn get_crc(&mut self) -> Result<(u32, u32)> {
        self.log.info("Fetching CRC...");
        let payload = self.request(OpCode::GetCrc, &[])?;
        if payload.len() < 8 {
            self.log.error(&format!(
                "Response too short for GET_CRC! Received: {} Expected: {}",
                payload.len(),
                8
            ));
            return Err(UpdateError::PayloadShort {
                expected: 8,
                got: payload.len(),
            });
        }
        let offset = codec::u32_decode_slice(&payload[0..4]);
        let crc = codec::u32_decode_slice(&payload[4..8]);
        self.log.info(&format!("[OK]: [0x{offset:x}, 0x{crc:x}]"));
        Ok((offset, crc))
    }

    /// Ask the device to execute (commit) the object it just received.
    fn set_execute(&mut self) -> Result<()> {
        self.log.info("Setting Execute...");
        self.request(OpCode::SetExecute, &[])?;
        self.log.info("[OK]");
        Ok(())
    }

    /// Stream `length` bytes from `file` in MTU-sized chunks, updating
    /// `crc` in place, then verify the device's reported offset and CRC.
    ///
    /// WRITE_OBJECT expects no per-chunk response while PRN is 0 — chunks
    /// are sent back to back and only the trailing GET_CRC is awaited.
    fn stream_data(
        &mut self,
        path: &Path,
        file: &mut File,
        length: u64,
        crc: &mut u32,
        start_offset: u32,
    ) -> Result<()> {
        let chunk_size = ((self.mtu as i64 - 1) / 2 - 1).max(0) as usize;
        if chunk_size == 0 {
            self.log
                .error(&format!("MTU {} yields a non-positive chunk size", self.mtu));
            return Err(UpdateError::InvalidMtu { mtu: self.mtu });
        }
        if chunk_size > MSG_BUFFER_SIZE - 1 {
            self.log.error(&format!(
                "Chunk size 0x{:x} exceeds message buffer capacity 0x{:x}",
                chunk_size,
                MSG_BUFFER_SIZE - 1
            ));
            return Err(UpdateError::ChunkTooLarge {
                chunk_size,
                capacity: MSG_BUFFER_SIZE - 1,
            });
        }

        self.log.info(&format!(
            "Streaming file of size 0x{length:x} with chunk size 0x{chunk_size:x}..."
        ));

        let mut sent: u64 = 0;
        let mut buf = vec![0u8; chunk_size];
        while sent < length {
            let want = chunk_size.min((length - sent) as usize);
            let got = file.read(&mut buf[..want]).map_err(|source| {
                self.log
                    .error(&format!("Failed to read {}: {source}", path.display()));
                UpdateError::FileIo {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            if got == 0 {
                break;
            }
            *crc = codec::crc32(&buf[..got], *crc);
            self.send_command(OpCode::WriteObject, &buf[..got])?;
            sent += got as u64;
        }

        self.log.info("[OK]");

        let (device_offset, device_crc) = self.get_crc()?;
        if device_crc != *crc {
            self.log.error(&format!(
                "CRC mismatch: expected 0x{:08x}, device reported 0x{:08x}",
                *crc, device_crc
            ));
            return Err(UpdateError::VerifyCrc {
                expected: *crc,
                actual: device_crc,
            });
        }

        let expected_offset = start_offset + sent as u32;
        if device_offset != expected_offset {
            self.log.error(&format!(
                "Offset mismatch: expected {expected_offset}, device reported {device_offset}"
            ));
            return Err(UpdateError::VerifyOffset {
                expected: expected_offset,
                actual: device_offset,
            });
        }

        Ok(())
    }

    /// Select the COMMAND object, stream the init-packet file, and execute it.
    /// Returns the running CRC accumulated over the init-packet's bytes, which
    /// the firmware transfer continues from (the device's own CRC register
    /// accumulates across both transfers the same way).
    fn send_init_packet(&mut self, path: &Path) -> Result<u32> {
        self.log.info(&format!("Opening {}...", path.display()));
        let mut file = File::open(path).map_err(|source| {
            self.log
                .error(&format!("Failed to open {}: {source}", path.display()));
            UpdateError::FileIo {
                path: path.display().to_string(),
                source,
            }
        })?;
        self.log.info("[OK]");

        let file_size = file
            .metadata()
            .map_err(|source| {
                self.log
                    .error(&format!("Failed to stat {}: {source}", path.display()));
                UpdateError::FileIo {
                    path: path.display().to_string(),
                    source,
                }
            })?
            .len();

        self.enter(Stage::SelectedCmd);
        let obj_sel = self.select_object(ObjectType::Command)?;

        if file_size > obj_sel.max_size as u64 {
            self.log.error(&format!(
                "File size {file_size} exceeds object max_size {}",
                obj_sel.max_size
            ));
            return Err(UpdateError::SizeExceeded {
                size: file_size,
                max_size: obj_sel.max_size,
            });
        }
        if obj_sel.offset != 0 {
            self.log.info(&format!("Offset at 0x{:x}", obj_sel.offset));
        }

        self.enter(Stage::CreatedCmd);
        self.create_object(ObjectType::Command, file_size as u32)?;

        self.enter(Stage::StreamedCmd);
        let mut crc = 0u32;
        self.stream_data(path, &mut file, file_size, &mut crc, 0)?;
        self.enter(Stage::VerifiedCmd);

        self.enter(Stage::ExecutedCmd);
        self.set_execute()?;

        Ok(crc)
    }

    /// Select the DATA object and stream the firmware image, one
    /// create/stream/execute cycle per `max_size`-sized chunk of the file.
    /// `crc` is the running CRC accumulated so far (carried over from the
    /// init-packet transfer) and is updated in place as firmware bytes are streamed.
    ///
    /// The device-reported resume offset is deliberately ignored: every
    /// update starts the data object from byte zero.
    fn send_firmware(&mut self, path: &Path, crc: &mut u32) -> Result<()> {
        self.log.info(&format!("open {}", path.display()));
        let mut file = File::open(path).map_err(|source| {
            self.log
                .error(&format!("Failed to open {}: {source}", path.display()));
            UpdateError::FileIo {
                path: path.display().to_string(),
                source,
            }
        })?;
        self.log.info("[OK]");

        let file_size = file
            .metadata()
            .map_err(|source| {
                self.log
                    .error(&format!("Failed to stat {}: {source}", path.display()));
                UpdateError::FileIo {
                    path: path.display().to_string(),
                    source,
                }
            })?
            .len();

        self.enter(Stage::SelectedData);
        let obj_sel = self.select_object(ObjectType::Data)?;
        if obj_sel.offset != 0 {
            self.log.info(&format!("Offset at 0x{:x}", obj_sel.offset));
        }

        let mut obj_offset: u64 = 0;
        while obj_offset < file_size {
            let obj_size = obj_sel.max_size.min((file_size - obj_offset) as u32);

            self.enter(Stage::CreatedData);
            self.create_object(ObjectType::Data, obj_size)?;

            file.seek(SeekFrom::Start(obj_offset)).map_err(|source| {
                self.log
                    .error(&format!("Failed to seek {}: {source}", path.display()));
                UpdateError::FileIo {
                    path: path.display().to_string(),
                    source,
                }
            })?;

            self.enter(Stage::StreamedData);
            self.stream_data(path, &mut file, obj_size as u64, crc, obj_offset as u32)?;
            self.enter(Stage::VerifiedData);

            self.enter(Stage::ExecutedData);
            self.set_execute()?;

            obj_offset += obj_size as u64;
        }

        Ok(())
    }

    /// Run the full update sequence: ping, PRN, MTU, init-packet, firmware.
    pub fn run(&mut self, init_packet: &Path, firmware: &Path, prn: u16) -> Result<()> {
        self.enter(Stage::Start);

        self.ping()?;
        self.enter(Stage::Pinged);

        self.set_prn(prn)?;
        self.enter(Stage::PrnSet);

        self.get_mtu()?;
        self.enter(Stage::MtuKnown);

        let mut crc = self.send_init_packet(init_packet)?;
        self.send_firmware(firmware, &mut crc)?;

        self.enter(Stage::Done);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;
    use crate::transport::mock::MockTransport;

    fn log() -> SessionLog {
        SessionLog::new(LogLevel::Debug)
    }

    fn response(opcode: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![RESPONSE_MARKER, opcode, RESCODE_SUCCESS];
        frame.extend_from_slice(payload);
        slip::encode_frame(&frame)
    }

    #[test]
    fn ping_sends_token_and_checks_echo() {
        let mut t = MockTransport::new();
        t.push_response(response(OpCode::Ping as u8, &[]));
        let mut session = Session::new(t, log());

        session.ping().unwrap();

        let sent = slip::decode_frame(
            &session.transport.sent[0][..session.transport.sent[0].len() - 1],
        )
        .unwrap();
        assert_eq!(sent, vec![OpCode::Ping as u8, 0x01]);
    }

    #[test]
    fn set_prn_encodes_little_endian_u16() {
        let mut t = MockTransport::new();
        t.push_response(response(OpCode::SetPrn as u8, &[]));
        let mut session = Session::new(t, log());

        session.set_prn(0x1234).unwrap();

        let sent = slip::decode_frame(
            &session.transport.sent[0][..session.transport.sent[0].len() - 1],
        )
        .unwrap();
        assert_eq!(sent, vec![OpCode::SetPrn as u8, 0x34, 0x12]);
        assert_eq!(session.prn, 0x1234);
    }

    #[test]
    fn get_mtu_parses_payload() {
        let mut t = MockTransport::new();
        t.push_response(response(OpCode::GetMtu as u8, &[0xF4, 0x01]));
        let mut session = Session::new(t, log());

        session.get_mtu().unwrap();
        assert_eq!(session.mtu, 0x01F4);
    }

    #[test]
    fn get_mtu_rejects_short_payload() {
        let mut t = MockTransport::new();
        t.push_response(response(OpCode::GetMtu as u8, &[0x01]));
        let mut session = Session::new(t, log());

        let err = session.get_mtu().unwrap_err();
        assert!(matches!(err, UpdateError::PayloadShort { .. }));
    }

    #[test]
    fn select_object_parses_triple() {
        let mut t = MockTransport::new();
        let mut payload = Vec::new();
        let mut buf = [0u8; 4];
        codec::u32_encode(1024, &mut buf);
        payload.extend_from_slice(&buf);
        codec::u32_encode(0, &mut buf);
        payload.extend_from_slice(&buf);
        codec::u32_encode(0xDEAD_BEEF, &mut buf);
        payload.extend_from_slice(&buf);
        t.push_response(response(OpCode::ObjectSelect as u8, &payload));
        let mut session = Session::new(t, log());

        let resp = session.select_object(ObjectType::Command).unwrap();
        assert_eq!(resp.max_size, 1024);
        assert_eq!(resp.offset, 0);
        assert_eq!(resp.crc, 0xDEAD_BEEF);
    }

    #[test]
    fn receive_response_rejects_short_frame() {
        let mut t = MockTransport::new();
        t.push_response(slip::encode_frame(&[0x01, 0x02]));
        let mut session = Session::new(t, log());

        let err = session.receive_response(OpCode::Ping).unwrap_err();
        assert!(matches!(err, UpdateError::FramingShort { .. }));
    }

    #[test]
    fn receive_response_rejects_missing_marker() {
        let mut t = MockTransport::new();
        t.push_response(slip::encode_frame(&[0x00, OpCode::Ping as u8, RESCODE_SUCCESS]));
        let mut session = Session::new(t, log());

        let err = session.receive_response(OpCode::Ping).unwrap_err();
        assert!(matches!(err, UpdateError::FramingOpcode { got: 0x00 }));
    }

    #[test]
    fn receive_response_rejects_opcode_mismatch() {
        let mut t = MockTransport::new();
        t.push_response(response(OpCode::GetMtu as u8, &[0, 0]));
        let mut session = Session::new(t, log());

        let err = session.receive_response(OpCode::Ping).unwrap_err();
        assert!(matches!(
            err,
            UpdateError::OpcodeMismatch {
                sent,
                echoed
            } if sent == OpCode::Ping as u8 && echoed == OpCode::GetMtu as u8
        ));
    }

    #[test]
    fn receive_response_rejects_failure_result_code() {
        let mut t = MockTransport::new();
        t.push_response(slip::encode_frame(&[RESPONSE_MARKER, OpCode::Ping as u8, 0x02]));
        let mut session = Session::new(t, log());

        let err = session.receive_response(OpCode::Ping).unwrap_err();
        assert!(matches!(err, UpdateError::ResultFailure { code: 0x02, .. }));
    }

    #[test]
    fn stream_data_accumulates_crc_and_verifies_offset() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut t = MockTransport::new();
        let expected_crc = codec::crc32(data, 0);
        let mut crc_payload = Vec::new();
        let mut buf = [0u8; 4];
        codec::u32_encode(data.len() as u32, &mut buf);
        crc_payload.extend_from_slice(&buf);
        codec::u32_encode(expected_crc, &mut buf);
        crc_payload.extend_from_slice(&buf);
        t.push_response(response(OpCode::GetCrc as u8, &crc_payload));

        let mut session = Session::new(t, log());
        session.mtu = 64;

        let mut tmp = tempfile_with(data);
        let mut crc = 0u32;
        session
            .stream_data(Path::new("test-data"), &mut tmp, data.len() as u64, &mut crc, 0)
            .unwrap();
        assert_eq!(crc, expected_crc);
    }

    #[test]
    fn stream_data_rejects_crc_mismatch() {
        let data = b"some firmware bytes";
        let mut t = MockTransport::new();
        let mut crc_payload = Vec::new();
        let mut buf = [0u8; 4];
        codec::u32_encode(data.len() as u32, &mut buf);
        crc_payload.extend_from_slice(&buf);
        codec::u32_encode(0xBAD_C0DE, &mut buf);
        crc_payload.extend_from_slice(&buf);
        t.push_response(response(OpCode::GetCrc as u8, &crc_payload));

        let mut session = Session::new(t, log());
        session.mtu = 64;

        let mut tmp = tempfile_with(data);
        let mut crc = 0u32;
        let err = session
            .stream_data(Path::new("test-data"), &mut tmp, data.len() as u64, &mut crc, 0)
            .unwrap_err();
        assert!(matches!(err, UpdateError::VerifyCrc { .. }));
    }

    #[test]
    fn stream_data_rejects_offset_mismatch() {
        let data = b"some firmware bytes";
        let mut t = MockTransport::new();
        let expected_crc = codec::crc32(data, 0);
        let mut crc_payload = Vec::new();
        let mut buf = [0u8; 4];
        codec::u32_encode(999, &mut buf);
        crc_payload.extend_from_slice(&buf);
        codec::u32_encode(expected_crc, &mut buf);
        crc_payload.extend_from_slice(&buf);
        t.push_response(response(OpCode::GetCrc as u8, &crc_payload));

        let mut session = Session::new(t, log());
        session.mtu = 64;

        let mut tmp = tempfile_with(data);
        let mut crc = 0u32;
        let err = session
            .stream_data(Path::new("test-data"), &mut tmp, data.len() as u64, &mut crc, 0)
            .unwrap_err();
        assert!(matches!(err, UpdateError::VerifyOffset { .. }));
    }

    #[test]
    fn stream_data_rejects_oversized_chunk() {
        let t = MockTransport::new();
        let mut session = Session::new(t, log());
        // chunk_size = ((1000-1)/2)-1 = 498, which exceeds the 127-byte buffer cap.
        session.mtu = 1000;
        let data = b"irrelevant";
        let mut tmp = tempfile_with(data);
        let mut crc = 0u32;
        let err = session
            .stream_data(Path::new("test-data"), &mut tmp, data.len() as u64, &mut crc, 0)
            .unwrap_err();
        assert!(matches!(err, UpdateError::ChunkTooLarge { .. }));
    }

    #[test]
    fn stream_data_rejects_degenerate_mtu() {
        let t = MockTransport::new();
        let mut session = Session::new(t, log());
        session.mtu = 1;

        let data = b"x";
        let mut tmp = tempfile_with(data);
        let mut crc = 0u32;
        let err = session
            .stream_data(Path::new("test-data"), &mut tmp, data.len() as u64, &mut crc, 0)
            .unwrap_err();
        assert!(matches!(err, UpdateError::InvalidMtu { .. }));
    }

    /// A throwaway file backing `stream_data`'s `Read`/`Seek` bound, since
    /// the streaming path reads straight from a `File` rather than a
    /// generic reader.
    fn tempfile_with(data: &[u8]) -> File {
        use std::io::Write;
        let mut path = std::env::temp_dir();
        path.push(format!(
            "nrfu-protocol-test-{:p}-{}",
            data.as_ptr(),
            data.len()
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(data).unwrap();
        drop(f);
        let f = File::open(&path).unwrap();
        std::fs::remove_file(&path).ok();
        f
    }
}
