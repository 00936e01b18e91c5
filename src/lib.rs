//! nl2link - client library for the NoLimits 2 telemetry protocol
//!
//! The telemetry server speaks a binary, length-framed request/reply
//! protocol over a single long-lived TCP connection (default port 15151,
//! enabled by starting the simulator with `--telemetry`). This crate
//! implements the frame codec, the typed payload codecs for all message
//! types, the telemetry and station-state decoders, a declarative command
//! table, and a synchronous client session.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nl2link::{Reply, Session};
//!
//! let mut session = Session::connect("localhost")?;
//!
//! let round_trip = session.get_telemetry()?;
//! if let Reply::Telemetry(snapshot) = round_trip.reply {
//!     println!(
//!         "speed {:.1} m/s, pitch {:.1} deg",
//!         snapshot.speed,
//!         snapshot.pitch_deg()
//!     );
//! }
//!
//! // Commands resolve by name or short alias.
//! session.send_command("d")?; // dispatch
//! # Ok::<(), nl2link::Error>(())
//! ```
//!
//! # Scope
//!
//! One request is outstanding per session at a time; the protocol matches
//! replies to requests by order, not by id. The crate has no reconnection
//! or retry policy, no pipelining, and no timeouts; those belong to the
//! caller.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod command;
pub mod protocol;
pub mod telemetry;

pub use client::{RoundTrip, Session};
pub use command::{CommandDefaults, CommandSpec, commands, resolve, resolve_with};
pub use protocol::{
    END_MAGIC, Error, FRAME_OVERHEAD, Frame, HEADER_SIZE, MAX_PAYLOAD_SIZE, MessageType,
    PayloadSchema, Reply, Request, Result, START_MAGIC, TELEMETRY_SIZE, Version,
};
pub use telemetry::{Quaternion, StationState, TelemetrySnapshot, Vec3};

/// Default TCP port of the telemetry server
pub const DEFAULT_PORT: u16 = 15151;
