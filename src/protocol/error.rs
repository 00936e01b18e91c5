//! Protocol and session error types

use thiserror::Error;

use super::{MAX_PAYLOAD_SIZE, TELEMETRY_SIZE};

/// Errors produced by the frame codec, payload codecs, and client session
#[derive(Error, Debug)]
pub enum Error {
    /// A magic byte on the wire did not match the expected value
    #[error("malformed frame: bad {position} magic byte {found:#04x}")]
    MalformedFrame {
        /// Which magic byte was wrong ("start" or "end")
        position: &'static str,
        /// Byte actually read
        found: u8,
    },

    /// The stream ended before a complete frame was read
    #[error("connection closed by server mid-frame")]
    ConnectionClosed,

    /// Payload exceeds the 16-bit length field of the envelope
    #[error("payload too large: {size} bytes (max {MAX_PAYLOAD_SIZE})")]
    PayloadTooLarge {
        /// Attempted payload size
        size: usize,
    },

    /// A string payload was not valid UTF-8
    #[error("invalid UTF-8 in string payload")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    /// A telemetry payload was not exactly the fixed record size
    #[error("bad telemetry payload size: {size} bytes (expected {TELEMETRY_SIZE})")]
    BadTelemetrySize {
        /// Payload size actually received
        size: usize,
    },

    /// A fixed-size payload had the wrong length for its message type
    #[error("invalid payload size for {context}: {size} bytes (expected {expected})")]
    InvalidPayloadSize {
        /// Message type or field the size check applies to
        context: &'static str,
        /// Size actually seen
        size: usize,
        /// Size the schema requires
        expected: usize,
    },

    /// Command name not present in the command table
    #[error("unknown command: {name:?}")]
    UnknownCommand {
        /// The unresolved input
        name: String,
    },

    /// Operation attempted on a closed or abandoned session
    #[error("session is closed")]
    SessionClosed,

    /// IO error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error leaves the connection in an unusable state.
    ///
    /// Framing and IO errors mean the stream position is indeterminate and
    /// the session must be closed. Payload decode errors consume the whole
    /// frame first, so the session stays usable for the next round trip.
    #[must_use]
    pub const fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedFrame { .. } | Self::ConnectionClosed | Self::Io(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::ConnectionClosed.is_connection_fatal());
        assert!(
            Error::MalformedFrame {
                position: "start",
                found: 0x00
            }
            .is_connection_fatal()
        );
        assert!(!Error::BadTelemetrySize { size: 75 }.is_connection_fatal());
        assert!(!Error::SessionClosed.is_connection_fatal());
        assert!(
            !Error::UnknownCommand {
                name: "boguscmd".into()
            }
            .is_connection_fatal()
        );
    }
}
