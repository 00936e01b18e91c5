//! Message type catalogue and payload schemas

use std::fmt;

use super::TELEMETRY_SIZE;

/// Message types of the telemetry protocol
///
/// The catalogue is closed: codes 0 through 32 with a gap at 22/23. Codes
/// received from the server that are not in this table are surfaced as
/// unrecognized replies rather than failing the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    /// Keep-alive, answered with [`MessageType::Ok`]
    Idle = 0,
    /// Generic success reply
    Ok = 1,
    /// Error reply carrying a UTF-8 message
    Error = 2,
    /// Request the application version
    GetVersion = 3,
    /// Version reply (4 bytes, major to revision)
    Version = 4,
    /// Request the common telemetry record
    GetTelemetry = 5,
    /// Telemetry reply (fixed 76-byte record)
    Telemetry = 6,
    /// Request the number of coasters
    GetCoasterCount = 7,
    /// Single int reply
    IntValue = 8,
    /// Request a coaster name by index
    GetCoasterName = 9,
    /// UTF-8 string reply
    String = 10,
    /// Request current coaster and nearest station indices
    GetCurrentCoasterAndNearestStation = 11,
    /// Int pair reply
    IntValuePair = 12,
    /// Switch the emergency stop of a coaster
    SetEmergencyStop = 13,
    /// Request the state flags of a station
    GetStationState = 14,
    /// Station state reply (4-byte bitmask)
    StationState = 15,
    /// Switch a station between manual and automatic mode
    SetManualMode = 16,
    /// Dispatch a train in manual mode
    Dispatch = 17,
    /// Open or close station gates in manual mode
    SetGates = 18,
    /// Open or close harnesses in manual mode
    SetHarness = 19,
    /// Raise or lower the station platform in manual mode
    SetPlatform = 20,
    /// Lock or unlock the flyer car in manual mode
    SetFlyerCar = 21,
    /// Load and start a park by path
    LoadPark = 24,
    /// Close the currently loaded park
    ClosePark = 25,
    /// Ask the server to quit (connection is lost afterwards)
    QuitServer = 26,
    /// Switch the pause state in play mode
    SetPause = 27,
    /// Stop and restart the current park
    ResetPark = 28,
    /// Select a specific seat
    SelectSeat = 29,
    /// Enable or disable attraction mode
    SetAttractionMode = 30,
    /// Recenter VR
    RecenterVr = 31,
    /// Set a custom fly/walk view
    SetCustomView = 32,
}

/// Payload size rule of a message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSchema {
    /// No payload
    Empty,
    /// Exactly this many bytes
    Fixed(usize),
    /// Variable-length UTF-8 string spanning the whole payload
    Utf8,
    /// One prefix byte followed by a UTF-8 string
    BytePrefixedUtf8,
}

impl MessageType {
    /// Convert from a wire code
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Ok),
            2 => Some(Self::Error),
            3 => Some(Self::GetVersion),
            4 => Some(Self::Version),
            5 => Some(Self::GetTelemetry),
            6 => Some(Self::Telemetry),
            7 => Some(Self::GetCoasterCount),
            8 => Some(Self::IntValue),
            9 => Some(Self::GetCoasterName),
            10 => Some(Self::String),
            11 => Some(Self::GetCurrentCoasterAndNearestStation),
            12 => Some(Self::IntValuePair),
            13 => Some(Self::SetEmergencyStop),
            14 => Some(Self::GetStationState),
            15 => Some(Self::StationState),
            16 => Some(Self::SetManualMode),
            17 => Some(Self::Dispatch),
            18 => Some(Self::SetGates),
            19 => Some(Self::SetHarness),
            20 => Some(Self::SetPlatform),
            21 => Some(Self::SetFlyerCar),
            24 => Some(Self::LoadPark),
            25 => Some(Self::ClosePark),
            26 => Some(Self::QuitServer),
            27 => Some(Self::SetPause),
            28 => Some(Self::ResetPark),
            29 => Some(Self::SelectSeat),
            30 => Some(Self::SetAttractionMode),
            31 => Some(Self::RecenterVr),
            32 => Some(Self::SetCustomView),
            _ => None,
        }
    }

    /// Convert to the wire code
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether this type is sent by the client
    #[must_use]
    pub const fn is_request(self) -> bool {
        !self.is_reply()
    }

    /// Whether this type is sent by the server
    #[must_use]
    pub const fn is_reply(self) -> bool {
        matches!(
            self,
            Self::Ok
                | Self::Error
                | Self::Version
                | Self::Telemetry
                | Self::IntValue
                | Self::String
                | Self::IntValuePair
                | Self::StationState
        )
    }

    /// Payload size rule for this message type
    #[must_use]
    pub const fn payload_schema(self) -> PayloadSchema {
        match self {
            Self::Idle
            | Self::Ok
            | Self::GetVersion
            | Self::GetTelemetry
            | Self::GetCoasterCount
            | Self::GetCurrentCoasterAndNearestStation
            | Self::ClosePark
            | Self::QuitServer
            | Self::RecenterVr => PayloadSchema::Empty,
            Self::Error | Self::String => PayloadSchema::Utf8,
            Self::LoadPark => PayloadSchema::BytePrefixedUtf8,
            Self::Version | Self::IntValue | Self::GetCoasterName | Self::StationState => {
                PayloadSchema::Fixed(4)
            }
            Self::SetEmergencyStop => PayloadSchema::Fixed(5),
            Self::IntValuePair | Self::GetStationState | Self::Dispatch => PayloadSchema::Fixed(8),
            Self::SetManualMode
            | Self::SetGates
            | Self::SetHarness
            | Self::SetPlatform
            | Self::SetFlyerCar => PayloadSchema::Fixed(9),
            Self::SetPause | Self::ResetPark | Self::SetAttractionMode => PayloadSchema::Fixed(1),
            Self::SelectSeat => PayloadSchema::Fixed(16),
            Self::SetCustomView => PayloadSchema::Fixed(21),
            Self::Telemetry => PayloadSchema::Fixed(TELEMETRY_SIZE),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Ok => "Ok",
            Self::Error => "Error",
            Self::GetVersion => "GetVersion",
            Self::Version => "Version",
            Self::GetTelemetry => "GetTelemetry",
            Self::Telemetry => "Telemetry",
            Self::GetCoasterCount => "GetCoasterCount",
            Self::IntValue => "IntValue",
            Self::GetCoasterName => "GetCoasterName",
            Self::String => "String",
            Self::GetCurrentCoasterAndNearestStation => "GetCurrentCoasterAndNearestStation",
            Self::IntValuePair => "IntValuePair",
            Self::SetEmergencyStop => "SetEmergencyStop",
            Self::GetStationState => "GetStationState",
            Self::StationState => "StationState",
            Self::SetManualMode => "SetManualMode",
            Self::Dispatch => "Dispatch",
            Self::SetGates => "SetGates",
            Self::SetHarness => "SetHarness",
            Self::SetPlatform => "SetPlatform",
            Self::SetFlyerCar => "SetFlyerCar",
            Self::LoadPark => "LoadPark",
            Self::ClosePark => "ClosePark",
            Self::QuitServer => "QuitServer",
            Self::SetPause => "SetPause",
            Self::ResetPark => "ResetPark",
            Self::SelectSeat => "SelectSeat",
            Self::SetAttractionMode => "SetAttractionMode",
            Self::RecenterVr => "RecenterVr",
            Self::SetCustomView => "SetCustomView",
        };
        write!(f, "{name}")
    }
}
