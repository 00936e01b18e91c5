//! Decoded reply messages
//!
//! Dispatches a received frame on its message type and decodes the payload.
//! A server `Error` reply is a successful frame carrying an application
//! error string; it is surfaced as data, not as a decode failure.

use std::fmt;

use bytes::{Buf, Bytes};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Error, Frame, MessageType, Result};
use crate::telemetry::{StationState, TelemetrySnapshot};

/// Application version reply (4 bytes, e.g. 2.2.0.0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Build number
    pub build: u8,
    /// Revision number
    pub revision: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// A reply message received from the server
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Idle echo (only seen from servers echoing the keep-alive)
    Idle,
    /// Generic success
    Ok,
    /// Application-level error message; `None` if the bytes were not UTF-8
    Error(Option<String>),
    /// Application version
    Version(Version),
    /// Telemetry record
    Telemetry(TelemetrySnapshot),
    /// Single int value; meaning depends on the request
    IntValue(i32),
    /// String value; `None` if the bytes were not UTF-8
    String(Option<String>),
    /// Int value pair; meaning depends on the request
    IntPair(i32, i32),
    /// Station state flags
    StationState(StationState),
    /// A type code outside the known catalogue; not a stream error
    Unrecognized {
        /// Raw message type code
        type_code: u16,
        /// Raw payload bytes
        payload: Bytes,
    },
}

impl Reply {
    /// Decode the payload of a received frame
    ///
    /// # Errors
    ///
    /// Returns a payload codec error ([`Error::BadTelemetrySize`],
    /// [`Error::InvalidPayloadSize`]) if the frame is structurally valid but
    /// its content does not match the schema of its type. The frame has been
    /// fully consumed off the stream in either case.
    pub fn decode(frame: &Frame) -> Result<Self> {
        let payload = frame.payload();
        let Some(message_type) = frame.message_type() else {
            warn!(
                type_code = frame.type_code(),
                "unrecognized message type from server"
            );
            return Ok(Self::Unrecognized {
                type_code: frame.type_code(),
                payload: payload.clone(),
            });
        };

        match message_type {
            MessageType::Idle => Ok(Self::Idle),
            MessageType::Ok => Ok(Self::Ok),
            MessageType::Error => Ok(Self::Error(lossy_string(payload))),
            MessageType::String => Ok(Self::String(lossy_string(payload))),
            MessageType::Version => {
                check_size("Version", payload, 4)?;
                Ok(Self::Version(Version {
                    major: payload[0],
                    minor: payload[1],
                    build: payload[2],
                    revision: payload[3],
                }))
            }
            MessageType::Telemetry => {
                Ok(Self::Telemetry(TelemetrySnapshot::decode(payload)?))
            }
            MessageType::IntValue => {
                check_size("IntValue", payload, 4)?;
                let mut buf = &payload[..];
                Ok(Self::IntValue(buf.get_i32()))
            }
            MessageType::IntValuePair => {
                check_size("IntValuePair", payload, 8)?;
                let mut buf = &payload[..];
                Ok(Self::IntPair(buf.get_i32(), buf.get_i32()))
            }
            MessageType::StationState => Ok(Self::StationState(StationState::decode(payload)?)),
            // Request codes coming back from the server are outside the
            // reply surface; report them like unknown codes.
            other => {
                warn!(%other, "request-tagged message received as reply");
                Ok(Self::Unrecognized {
                    type_code: frame.type_code(),
                    payload: payload.clone(),
                })
            }
        }
    }
}

/// Decode a UTF-8 string payload
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the bytes are not valid UTF-8.
pub fn decode_string(payload: &[u8]) -> Result<String> {
    Ok(String::from_utf8(payload.to_vec())?)
}

/// String decode as used by the reply surface: invalid UTF-8 becomes an
/// absent string rather than failing the whole frame.
fn lossy_string(payload: &[u8]) -> Option<String> {
    match decode_string(payload) {
        Ok(s) => Some(s),
        Err(_) => {
            warn!(len = payload.len(), "discarding non-UTF-8 string payload");
            None
        }
    }
}

fn check_size(context: &'static str, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(Error::InvalidPayloadSize {
            context,
            size: payload.len(),
            expected,
        })
    }
}
