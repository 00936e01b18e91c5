//! Blocking frame I/O over a byte stream
//!
//! Reads are deterministic: every field is read with `read_exact`, so a
//! returned frame always accounts for exactly `10 + len` bytes from the
//! stream. There is no retry; a failed read leaves the stream position
//! indeterminate and the caller must close the connection.

use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::trace;

use super::{END_MAGIC, Error, Frame, HEADER_SIZE, Result, START_MAGIC};

/// Write one frame to the stream as a single logical write
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] if the frame cannot be encoded and
/// [`Error::Io`] on write failure.
pub fn write_frame<W: Write>(stream: &mut W, frame: &Frame) -> Result<()> {
    let bytes = frame.encode()?;
    stream.write_all(&bytes)?;
    stream.flush()?;
    trace!(
        type_code = frame.type_code(),
        request_id = frame.request_id(),
        wire_len = bytes.len(),
        "frame written"
    );
    Ok(())
}

/// Read exactly one frame from the stream
///
/// # Errors
///
/// Returns [`Error::ConnectionClosed`] if the stream ends before a complete
/// frame was read and [`Error::MalformedFrame`] on a wrong magic byte.
pub fn read_frame<R: Read>(stream: &mut R) -> Result<Frame> {
    let mut header = [0u8; HEADER_SIZE];
    read_all(stream, &mut header)?;

    if header[0] != START_MAGIC {
        return Err(Error::MalformedFrame {
            position: "start",
            found: header[0],
        });
    }

    let message_type = u16::from_be_bytes([header[1], header[2]]);
    let request_id = u32::from_be_bytes([header[3], header[4], header[5], header[6]]);
    let len = u16::from_be_bytes([header[7], header[8]]) as usize;

    let mut payload = vec![0u8; len];
    read_all(stream, &mut payload)?;

    let mut end = [0u8; 1];
    read_all(stream, &mut end)?;
    if end[0] != END_MAGIC {
        return Err(Error::MalformedFrame {
            position: "end",
            found: end[0],
        });
    }

    trace!(
        type_code = message_type,
        request_id,
        payload_len = len,
        "frame read"
    );
    Ok(Frame::from_wire(message_type, request_id, Bytes::from(payload)))
}

/// `read_exact` with end-of-stream mapped to [`Error::ConnectionClosed`]
fn read_all<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<()> {
    match stream.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::ConnectionClosed),
        Err(e) => Err(Error::Io(e)),
    }
}
