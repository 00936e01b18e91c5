//! Telemetry record and station state decoding
//!
//! The telemetry reply is a fixed 76-byte record, all fields big-endian:
//!
//! ```text
//! offset  field
//! 0       state flags (u32: bit0 in-play, bit1 onboard/braking, bit2 paused)
//! 4       rendered frame number (i32)
//! 8       view mode (i32)
//! 12      current coaster (i32)
//! 16      coaster style id (i32)
//! 20      current train (i32)
//! 24      current car (i32)
//! 28      current seat (i32)
//! 32      speed in m/s (f32)
//! 36      position x/y/z in meters (3 x f32)
//! 48      rotation quaternion x/y/z/w (4 x f32)
//! 64      g-force x/y/z (3 x f32)
//! ```

use bytes::Buf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::protocol::{Error, Result, TELEMETRY_SIZE};

/// State flag: play mode is active
const STATE_IN_PLAY: u32 = 1 << 0;
/// State flag: onboard / braking
const STATE_ONBOARD: u32 = 1 << 1;
/// State flag: pause is active
const STATE_PAUSED: u32 = 1 << 2;

/// A 3-component vector of the telemetry record
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

/// Rotation quaternion in the server's Y-up convention
///
/// Pure value type with no identity; the Euler conversions assume a unit
/// quaternion and perform no normalization. Feeding a non-unit quaternion
/// yields mathematically defined but physically meaningless angles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quaternion {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl Quaternion {
    /// Pitch in degrees (Y-up convention)
    #[must_use]
    pub fn pitch_deg(&self) -> f64 {
        let (x, y, z, w) = self.as_f64();
        let vx = 2.0 * (x * y + w * y);
        let vy = 2.0 * (w * x - y * z);
        let vz = 1.0 - 2.0 * (x * x + y * y);
        vy.atan2((vx * vx + vz * vz).sqrt()).to_degrees()
    }

    /// Yaw in degrees (Y-up convention)
    #[must_use]
    pub fn yaw_deg(&self) -> f64 {
        let (x, y, _, w) = self.as_f64();
        (2.0 * (x * y + w * y))
            .atan2(1.0 - 2.0 * (x * x + y * y))
            .to_degrees()
    }

    /// Roll in degrees (Y-up convention)
    #[must_use]
    pub fn roll_deg(&self) -> f64 {
        let (x, y, z, w) = self.as_f64();
        (2.0 * (x * y + w * z))
            .atan2(1.0 - 2.0 * (x * x + z * z))
            .to_degrees()
    }

    fn as_f64(&self) -> (f64, f64, f64, f64) {
        (
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.z),
            f64::from(self.w),
        )
    }
}

/// One decoded telemetry record
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetrySnapshot {
    /// Raw state bitmask (bits 3-31 reserved)
    pub state: u32,
    /// Rendered frame number; compare across polls to detect fresh data
    pub frame_number: i32,
    /// View mode (1 = ride view)
    pub view_mode: i32,
    /// Current coaster index
    pub coaster: i32,
    /// Coaster style id
    pub coaster_style: i32,
    /// Current train index
    pub train: i32,
    /// Current car index
    pub car: i32,
    /// Current seat index
    pub seat: i32,
    /// Speed in m/s
    pub speed: f32,
    /// Position in meters
    pub position: Vec3,
    /// Rotation quaternion (Y-up)
    pub rotation: Quaternion,
    /// G-force vector
    pub g_force: Vec3,
}

impl TelemetrySnapshot {
    /// Decode the fixed 76-byte telemetry payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadTelemetrySize`] if the payload length is wrong.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != TELEMETRY_SIZE {
            return Err(Error::BadTelemetrySize {
                size: payload.len(),
            });
        }

        let mut buf = payload;
        Ok(Self {
            state: buf.get_u32(),
            frame_number: buf.get_i32(),
            view_mode: buf.get_i32(),
            coaster: buf.get_i32(),
            coaster_style: buf.get_i32(),
            train: buf.get_i32(),
            car: buf.get_i32(),
            seat: buf.get_i32(),
            speed: buf.get_f32(),
            position: Vec3 {
                x: buf.get_f32(),
                y: buf.get_f32(),
                z: buf.get_f32(),
            },
            rotation: Quaternion {
                x: buf.get_f32(),
                y: buf.get_f32(),
                z: buf.get_f32(),
                w: buf.get_f32(),
            },
            g_force: Vec3 {
                x: buf.get_f32(),
                y: buf.get_f32(),
                z: buf.get_f32(),
            },
        })
    }

    /// Whether play mode is active
    #[must_use]
    pub const fn in_play(&self) -> bool {
        self.state & STATE_IN_PLAY != 0
    }

    /// Whether the view is onboard / braking
    #[must_use]
    pub const fn onboard(&self) -> bool {
        self.state & STATE_ONBOARD != 0
    }

    /// Whether the simulation is paused
    #[must_use]
    pub const fn paused(&self) -> bool {
        self.state & STATE_PAUSED != 0
    }

    /// Pitch of the rotation quaternion in degrees
    #[must_use]
    pub fn pitch_deg(&self) -> f64 {
        self.rotation.pitch_deg()
    }

    /// Yaw of the rotation quaternion in degrees
    #[must_use]
    pub fn yaw_deg(&self) -> f64 {
        self.rotation.yaw_deg()
    }

    /// Roll of the rotation quaternion in degrees
    #[must_use]
    pub fn roll_deg(&self) -> f64 {
        self.rotation.roll_deg()
    }
}

/// Decoded station state bitmask
///
/// Bits 13-31 of the wire value are reserved and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationState {
    /// Emergency stop engaged
    pub e_stop: bool,
    /// Manual dispatch mode active
    pub manual_dispatch: bool,
    /// A train can be dispatched
    pub can_dispatch: bool,
    /// Gates can be closed
    pub can_close_gates: bool,
    /// Gates can be opened
    pub can_open_gates: bool,
    /// Harnesses can be closed
    pub can_close_harness: bool,
    /// Harnesses can be opened
    pub can_open_harness: bool,
    /// Platform can be raised
    pub can_raise_platform: bool,
    /// Platform can be lowered
    pub can_lower_platform: bool,
    /// Flyer car can be locked
    pub can_lock_flyer_car: bool,
    /// Flyer car can be unlocked
    pub can_unlock_flyer_car: bool,
    /// A stopped train is in the station
    pub train_in_station: bool,
    /// The train in the station is the current train of the ride view
    pub current_train_in_station: bool,
}

impl StationState {
    /// Decode from the raw 32-bit bitmask
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            e_stop: bits & (1 << 0) != 0,
            manual_dispatch: bits & (1 << 1) != 0,
            can_dispatch: bits & (1 << 2) != 0,
            can_close_gates: bits & (1 << 3) != 0,
            can_open_gates: bits & (1 << 4) != 0,
            can_close_harness: bits & (1 << 5) != 0,
            can_open_harness: bits & (1 << 6) != 0,
            can_raise_platform: bits & (1 << 7) != 0,
            can_lower_platform: bits & (1 << 8) != 0,
            can_lock_flyer_car: bits & (1 << 9) != 0,
            can_unlock_flyer_car: bits & (1 << 10) != 0,
            train_in_station: bits & (1 << 11) != 0,
            current_train_in_station: bits & (1 << 12) != 0,
        }
    }

    /// Decode the 4-byte station state payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPayloadSize`] if the payload is not 4 bytes.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != 4 {
            return Err(Error::InvalidPayloadSize {
                context: "StationState",
                size: payload.len(),
                expected: 4,
            });
        }
        let mut buf = payload;
        Ok(Self::from_bits(buf.get_u32()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> Vec<u8> {
        let mut payload = Vec::with_capacity(TELEMETRY_SIZE);
        payload.extend_from_slice(&0b011u32.to_be_bytes());
        payload.extend_from_slice(&1234i32.to_be_bytes());
        payload.extend_from_slice(&1i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&17i32.to_be_bytes());
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&2i32.to_be_bytes());
        payload.extend_from_slice(&3i32.to_be_bytes());
        payload.extend_from_slice(&31.5f32.to_be_bytes());
        for value in [12.0f32, -4.25, 830.0] {
            payload.extend_from_slice(&value.to_be_bytes());
        }
        for value in [0.0f32, 0.0, 0.0, 1.0] {
            payload.extend_from_slice(&value.to_be_bytes());
        }
        for value in [0.1f32, 1.0, -0.2] {
            payload.extend_from_slice(&value.to_be_bytes());
        }
        payload
    }

    #[test]
    fn test_decode_telemetry() {
        let snapshot = TelemetrySnapshot::decode(&sample_payload()).unwrap();

        assert!(snapshot.in_play());
        assert!(snapshot.onboard());
        assert!(!snapshot.paused());
        assert_eq!(snapshot.frame_number, 1234);
        assert_eq!(snapshot.view_mode, 1);
        assert_eq!(snapshot.coaster_style, 17);
        assert_eq!(snapshot.car, 2);
        assert_eq!(snapshot.seat, 3);
        assert_eq!(snapshot.speed, 31.5);
        assert_eq!(snapshot.position.z, 830.0);
        assert_eq!(snapshot.g_force.y, 1.0);
    }

    #[test]
    fn test_wrong_size_rejected() {
        let result = TelemetrySnapshot::decode(&[0u8; 75]);
        assert!(matches!(result, Err(Error::BadTelemetrySize { size: 75 })));

        let result = TelemetrySnapshot::decode(&[0u8; 77]);
        assert!(matches!(result, Err(Error::BadTelemetrySize { size: 77 })));
    }

    #[test]
    fn test_identity_quaternion_is_level() {
        let quat = Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        };

        assert!(quat.pitch_deg().abs() < 1e-9);
        assert!(quat.yaw_deg().abs() < 1e-9);
        assert!(quat.roll_deg().abs() < 1e-9);
    }

    #[test]
    fn test_quarter_roll() {
        // 90 degree rotation about the view axis (Z in the Y-up convention).
        let half = std::f64::consts::FRAC_PI_4;
        let quat = Quaternion {
            x: 0.0,
            y: 0.0,
            z: half.sin() as f32,
            w: half.cos() as f32,
        };

        assert!((quat.roll_deg() - 90.0).abs() < 1e-4);
        assert!(quat.pitch_deg().abs() < 1e-4);
    }

    #[test]
    fn test_station_state_bits() {
        let state = StationState::from_bits(0b0000000000101);

        assert!(state.e_stop);
        assert!(!state.manual_dispatch);
        assert!(state.can_dispatch);
        assert!(!state.can_close_gates);
        assert!(!state.current_train_in_station);
    }

    #[test]
    fn test_station_state_reserved_bits_ignored() {
        let state = StationState::from_bits(0xFFFF_E000);
        assert_eq!(state, StationState::default());

        let all = StationState::from_bits(0x1FFF);
        assert!(all.e_stop && all.current_train_in_station && all.can_unlock_flyer_car);
    }

    #[test]
    fn test_station_state_payload_size() {
        assert!(StationState::decode(&[0, 0, 0, 5]).is_ok());
        assert!(matches!(
            StationState::decode(&[0, 0, 0]),
            Err(Error::InvalidPayloadSize { expected: 4, .. })
        ));
    }
}
