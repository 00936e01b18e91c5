//! Telemetry protocol core
//!
//! Wire envelope, message type catalogue, and the typed request/reply
//! payload codecs.

mod codec;
mod error;
mod frame;
mod reply;
mod request;
mod types;

pub use codec::{read_frame, write_frame};
pub use error::{Error, Result};
pub use frame::Frame;
pub use reply::{Reply, Version, decode_string};
pub use request::Request;
pub use types::{MessageType, PayloadSchema};

/// First byte of every frame
pub const START_MAGIC: u8 = b'N';

/// Last byte of every frame
pub const END_MAGIC: u8 = b'L';

/// Envelope bytes preceding the payload (magic + type + request id + length)
pub const HEADER_SIZE: usize = 9;

/// Total envelope overhead of a frame (header plus end magic)
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + 1;

/// Maximum payload size representable by the 16-bit length field
pub const MAX_PAYLOAD_SIZE: usize = 65_535;

/// Size of the fixed telemetry record
pub const TELEMETRY_SIZE: usize = 76;
