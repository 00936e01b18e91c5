//! Typed request messages and their payload encoding
//!
//! Each variant corresponds to one request code of the catalogue. All
//! multi-byte values are encoded big-endian; floats as their IEEE-754 bit
//! pattern; booleans as one byte (`0x00`/`0x01`).

use bytes::{BufMut, Bytes, BytesMut};

use super::{Error, Frame, MessageType, Result};

/// A request message the client can send
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Keep the connection alive
    Idle,
    /// Query the application version
    GetVersion,
    /// Query the common telemetry record
    GetTelemetry,
    /// Query the number of coasters
    GetCoasterCount,
    /// Query the name of a coaster
    GetCoasterName {
        /// Coaster index (0-based)
        coaster: i32,
    },
    /// Query the current coaster and nearest station indices
    GetCurrentCoasterAndNearestStation,
    /// Switch the emergency stop of a coaster
    SetEmergencyStop {
        /// Coaster index
        coaster: i32,
        /// `true` engages the e-stop
        enabled: bool,
    },
    /// Query the state flags of a station
    GetStationState {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
    },
    /// Switch a station between manual and automatic mode
    SetManualMode {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
        /// `true` selects manual mode
        enabled: bool,
    },
    /// Dispatch a train in manual mode
    Dispatch {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
    },
    /// Open or close station gates in manual mode
    SetGates {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
        /// `true` opens the gates
        open: bool,
    },
    /// Open or close harnesses in manual mode
    SetHarness {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
        /// `true` opens the harnesses
        open: bool,
    },
    /// Raise or lower the station platform in manual mode
    SetPlatform {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
        /// `true` lowers the platform
        lowered: bool,
    },
    /// Lock or unlock the flyer car in manual mode
    SetFlyerCar {
        /// Coaster index
        coaster: i32,
        /// Station index
        station: i32,
        /// `true` unlocks the car
        unlocked: bool,
    },
    /// Load and start a park
    LoadPark {
        /// Park file path in the server's internal representation
        /// (`/` as separator, `intern:` prefix for library parks)
        path: String,
        /// Start in paused state instead of running
        start_paused: bool,
    },
    /// Close the currently loaded park
    ClosePark,
    /// Ask the server to quit; the connection is lost afterwards
    QuitServer,
    /// Switch the pause state in play mode
    SetPause {
        /// `true` pauses
        paused: bool,
    },
    /// Stop and restart the current park
    ResetPark {
        /// Restart in paused state
        start_paused: bool,
    },
    /// Select a specific seat
    SelectSeat {
        /// Coaster index
        coaster: i32,
        /// Train index
        train: i32,
        /// Car index
        car: i32,
        /// Seat index
        seat: i32,
    },
    /// Enable or disable attraction mode
    SetAttractionMode {
        /// `true` enables attraction mode
        enabled: bool,
    },
    /// Recenter VR
    RecenterVr,
    /// Set a custom fly/walk view
    SetCustomView {
        /// Position x in meters
        x: f32,
        /// Position y in meters
        y: f32,
        /// Position z in meters
        z: f32,
        /// Azimuth in degrees (0 = north)
        azimuth: f32,
        /// Elevation in degrees
        elevation: f32,
        /// `true` for walk view, `false` for fly view
        walk_view: bool,
    },
}

impl Request {
    /// Message type this request is sent as
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Idle => MessageType::Idle,
            Self::GetVersion => MessageType::GetVersion,
            Self::GetTelemetry => MessageType::GetTelemetry,
            Self::GetCoasterCount => MessageType::GetCoasterCount,
            Self::GetCoasterName { .. } => MessageType::GetCoasterName,
            Self::GetCurrentCoasterAndNearestStation => {
                MessageType::GetCurrentCoasterAndNearestStation
            }
            Self::SetEmergencyStop { .. } => MessageType::SetEmergencyStop,
            Self::GetStationState { .. } => MessageType::GetStationState,
            Self::SetManualMode { .. } => MessageType::SetManualMode,
            Self::Dispatch { .. } => MessageType::Dispatch,
            Self::SetGates { .. } => MessageType::SetGates,
            Self::SetHarness { .. } => MessageType::SetHarness,
            Self::SetPlatform { .. } => MessageType::SetPlatform,
            Self::SetFlyerCar { .. } => MessageType::SetFlyerCar,
            Self::LoadPark { .. } => MessageType::LoadPark,
            Self::ClosePark => MessageType::ClosePark,
            Self::QuitServer => MessageType::QuitServer,
            Self::SetPause { .. } => MessageType::SetPause,
            Self::ResetPark { .. } => MessageType::ResetPark,
            Self::SelectSeat { .. } => MessageType::SelectSeat,
            Self::SetAttractionMode { .. } => MessageType::SetAttractionMode,
            Self::RecenterVr => MessageType::RecenterVr,
            Self::SetCustomView { .. } => MessageType::SetCustomView,
        }
    }

    /// Encode the payload for this request
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if a variable-length payload does
    /// not fit the envelope's 16-bit length field.
    pub fn encode_payload(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        match self {
            Self::Idle
            | Self::GetVersion
            | Self::GetTelemetry
            | Self::GetCoasterCount
            | Self::GetCurrentCoasterAndNearestStation
            | Self::ClosePark
            | Self::QuitServer
            | Self::RecenterVr => {}
            Self::GetCoasterName { coaster } => {
                buf.put_i32(*coaster);
            }
            Self::SetEmergencyStop { coaster, enabled } => {
                buf.put_i32(*coaster);
                put_bool(&mut buf, *enabled);
            }
            Self::GetStationState { coaster, station } | Self::Dispatch { coaster, station } => {
                buf.put_i32(*coaster);
                buf.put_i32(*station);
            }
            Self::SetManualMode {
                coaster,
                station,
                enabled: flag,
            }
            | Self::SetGates {
                coaster,
                station,
                open: flag,
            }
            | Self::SetHarness {
                coaster,
                station,
                open: flag,
            }
            | Self::SetPlatform {
                coaster,
                station,
                lowered: flag,
            }
            | Self::SetFlyerCar {
                coaster,
                station,
                unlocked: flag,
            } => {
                buf.put_i32(*coaster);
                buf.put_i32(*station);
                put_bool(&mut buf, *flag);
            }
            Self::LoadPark { path, start_paused } => {
                let utf8 = path.as_bytes();
                if 1 + utf8.len() > super::MAX_PAYLOAD_SIZE {
                    return Err(Error::PayloadTooLarge {
                        size: 1 + utf8.len(),
                    });
                }
                put_bool(&mut buf, *start_paused);
                buf.put_slice(utf8);
            }
            Self::SetPause { paused: flag }
            | Self::ResetPark { start_paused: flag }
            | Self::SetAttractionMode { enabled: flag } => {
                put_bool(&mut buf, *flag);
            }
            Self::SelectSeat {
                coaster,
                train,
                car,
                seat,
            } => {
                buf.put_i32(*coaster);
                buf.put_i32(*train);
                buf.put_i32(*car);
                buf.put_i32(*seat);
            }
            Self::SetCustomView {
                x,
                y,
                z,
                azimuth,
                elevation,
                walk_view,
            } => {
                buf.put_f32(*x);
                buf.put_f32(*y);
                buf.put_f32(*z);
                buf.put_f32(*azimuth);
                buf.put_f32(*elevation);
                put_bool(&mut buf, *walk_view);
            }
        }
        Ok(buf.freeze())
    }

    /// Build the complete request frame with the given request id
    ///
    /// # Errors
    ///
    /// Propagates payload encoding failures.
    pub fn to_frame(&self, request_id: u32) -> Result<Frame> {
        let payload = self.encode_payload()?;
        Ok(Frame::new(self.message_type(), request_id, payload))
    }
}

/// Booleans are one byte on the wire; encode emits exactly 0 or 1
fn put_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(u8::from(value));
}

#[cfg(test)]
mod tests {
    use crate::protocol::PayloadSchema;

    use super::*;

    #[test]
    fn test_all_payload_sizes_match_schema() {
        let requests = [
            Request::Idle,
            Request::GetVersion,
            Request::GetTelemetry,
            Request::GetCoasterCount,
            Request::GetCoasterName { coaster: 0 },
            Request::GetCurrentCoasterAndNearestStation,
            Request::SetEmergencyStop {
                coaster: 0,
                enabled: true,
            },
            Request::GetStationState {
                coaster: 0,
                station: 0,
            },
            Request::SetManualMode {
                coaster: 0,
                station: 0,
                enabled: true,
            },
            Request::Dispatch {
                coaster: 0,
                station: 0,
            },
            Request::SetGates {
                coaster: 0,
                station: 0,
                open: true,
            },
            Request::SetHarness {
                coaster: 0,
                station: 0,
                open: false,
            },
            Request::SetPlatform {
                coaster: 0,
                station: 0,
                lowered: true,
            },
            Request::SetFlyerCar {
                coaster: 0,
                station: 0,
                unlocked: false,
            },
            Request::ClosePark,
            Request::QuitServer,
            Request::SetPause { paused: true },
            Request::ResetPark { start_paused: true },
            Request::SelectSeat {
                coaster: 0,
                train: 0,
                car: 0,
                seat: 1,
            },
            Request::SetAttractionMode { enabled: true },
            Request::RecenterVr,
            Request::SetCustomView {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                azimuth: 0.0,
                elevation: 0.0,
                walk_view: true,
            },
        ];

        for request in requests {
            let payload = request.encode_payload().unwrap();
            match request.message_type().payload_schema() {
                PayloadSchema::Empty => assert!(payload.is_empty(), "{request:?}"),
                PayloadSchema::Fixed(size) => assert_eq!(payload.len(), size, "{request:?}"),
                PayloadSchema::Utf8 | PayloadSchema::BytePrefixedUtf8 => {
                    unreachable!("no variable request in this list")
                }
            }
        }
    }

    #[test]
    fn test_set_emergency_stop_layout() {
        let payload = Request::SetEmergencyStop {
            coaster: 2,
            enabled: true,
        }
        .encode_payload()
        .unwrap();

        assert_eq!(payload.as_ref(), &[0, 0, 0, 2, 1]);
    }

    #[test]
    fn test_load_park_layout() {
        let payload = Request::LoadPark {
            path: "parks/Hybris/Hybris.nl2park".to_owned(),
            start_paused: true,
        }
        .encode_payload()
        .unwrap();

        assert_eq!(payload[0], 1);
        assert_eq!(&payload[1..], "parks/Hybris/Hybris.nl2park".as_bytes());
    }

    #[test]
    fn test_set_custom_view_layout() {
        let payload = Request::SetCustomView {
            x: 10.0,
            y: 3.0,
            z: 100.0,
            azimuth: 90.0,
            elevation: 43.0,
            walk_view: false,
        }
        .encode_payload()
        .unwrap();

        assert_eq!(payload.len(), 21);
        assert_eq!(payload[20], 0x00);
        assert_eq!(
            f32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]),
            10.0
        );
    }

    #[test]
    fn test_oversized_park_path_rejected() {
        let request = Request::LoadPark {
            path: "x".repeat(70_000),
            start_paused: false,
        };
        assert!(matches!(
            request.encode_payload(),
            Err(Error::PayloadTooLarge { .. })
        ));
    }
}
