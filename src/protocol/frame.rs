//! Wire envelope of the telemetry protocol
//!
//! Every message on the wire has the same shape:
//!
//! ```text
//! offset  size  field
//! 0       1     start magic = 'N' (0x4E)
//! 1       2     message type (u16, big-endian)
//! 3       4     request id (u32, big-endian)
//! 7       2     payload length L (u16, big-endian)
//! 9       L     payload (schema depends on message type)
//! 9+L     1     end magic = 'L' (0x4C)
//! ```

use bytes::Bytes;

use super::{END_MAGIC, Error, FRAME_OVERHEAD, MAX_PAYLOAD_SIZE, MessageType, Result, START_MAGIC};

/// One complete wire message (envelope plus payload)
///
/// The message type is kept as a raw `u16` so that unrecognized codes from
/// the server survive decoding; [`Frame::message_type`] gives the typed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    message_type: u16,
    request_id: u32,
    payload: Bytes,
}

impl Frame {
    /// Create a frame for a known message type
    pub fn new(message_type: MessageType, request_id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            message_type: message_type.as_u16(),
            request_id,
            payload: payload.into(),
        }
    }

    /// Create a frame from raw wire values
    pub fn from_wire(message_type: u16, request_id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            message_type,
            request_id,
            payload: payload.into(),
        }
    }

    /// Raw message type code
    #[must_use]
    pub const fn type_code(&self) -> u16 {
        self.message_type
    }

    /// Typed message type, if the code is in the catalogue
    #[must_use]
    pub const fn message_type(&self) -> Option<MessageType> {
        MessageType::from_u16(self.message_type)
    }

    /// Request id carried by the envelope
    #[must_use]
    pub const fn request_id(&self) -> u32 {
        self.request_id
    }

    /// Payload bytes
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Total wire length of the encoded frame
    #[must_use]
    pub const fn wire_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode the frame to a wire buffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload does not fit the
    /// 16-bit length field.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = self.payload.len();
        if len > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge { size: len });
        }

        let mut bytes = Vec::with_capacity(self.wire_len());
        bytes.push(START_MAGIC);
        bytes.extend_from_slice(&self.message_type.to_be_bytes());
        bytes.extend_from_slice(&self.request_id.to_be_bytes());
        bytes.extend_from_slice(&(len as u16).to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.push(END_MAGIC);
        Ok(bytes)
    }

    /// Decode a frame from a complete wire buffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the buffer is shorter than the
    /// envelope plus its declared payload, and [`Error::MalformedFrame`] if a
    /// magic byte is wrong.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_OVERHEAD {
            return Err(Error::ConnectionClosed);
        }
        if bytes[0] != START_MAGIC {
            return Err(Error::MalformedFrame {
                position: "start",
                found: bytes[0],
            });
        }

        let message_type = u16::from_be_bytes([bytes[1], bytes[2]]);
        let request_id = u32::from_be_bytes([bytes[3], bytes[4], bytes[5], bytes[6]]);
        let len = u16::from_be_bytes([bytes[7], bytes[8]]) as usize;

        if bytes.len() < FRAME_OVERHEAD + len {
            return Err(Error::ConnectionClosed);
        }
        let end = bytes[9 + len];
        if end != END_MAGIC {
            return Err(Error::MalformedFrame {
                position: "end",
                found: end,
            });
        }

        Ok(Self {
            message_type,
            request_id,
            payload: Bytes::copy_from_slice(&bytes[9..9 + len]),
        })
    }
}
