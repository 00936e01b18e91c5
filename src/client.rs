//! Client session: one connected stream, synchronous round trips
//!
//! A session owns the stream and a monotonically increasing request-id
//! counter, and enforces that exactly one request is outstanding at a time.
//! The server matches replies to requests by send order, not by id, so
//! interleaving a second request before the first reply would corrupt
//! correlation; the state machine makes that impossible instead of leaving
//! it to caller discipline.
//!
//! The underlying reads and writes may block indefinitely; the session
//! imposes no timeout. Callers needing bounded latency must wrap the round
//! trip in an external cancellation mechanism, and must treat a session
//! abandoned mid-round-trip as unusable (partial reads cannot be un-read).
//! Driving one session from several threads requires a lock held for the
//! whole round trip; the session itself does no locking.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use tracing::{debug, instrument};

use crate::DEFAULT_PORT;
use crate::command::{self, CommandDefaults};
use crate::protocol::{self, Error, Frame, Reply, Request, Result};

/// Round-trip state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Stream open, no request pending
    Idle,
    /// One frame written, exactly one reply expected
    AwaitingReply,
    /// Stream released or poisoned by a framing error
    Closed,
}

/// Result of one request/reply round trip
///
/// `request_id` is the id the session assigned; `echoed_id` is the id the
/// server sent back. The protocol correlates by order only, so the two are
/// reported side by side but not validated against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    /// Request id assigned by the session
    pub request_id: u32,
    /// Request id echoed in the reply envelope
    pub echoed_id: u32,
    /// Decoded reply payload
    pub reply: Reply,
}

/// A client session over one bidirectional byte stream
#[derive(Debug)]
pub struct Session<S> {
    stream: Option<S>,
    next_request_id: u32,
    state: State,
}

impl Session<TcpStream> {
    /// Connect to a telemetry server on the default port
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the TCP connection fails.
    pub fn connect(host: &str) -> Result<Self> {
        Self::connect_addr((host, DEFAULT_PORT))
    }

    /// Connect to a telemetry server at an explicit address
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the TCP connection fails.
    pub fn connect_addr(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        // Round trips are tiny request/reply pairs; don't let Nagle hold them.
        stream.set_nodelay(true)?;
        debug!(peer = ?stream.peer_addr().ok(), "session connected");
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> Session<S> {
    /// Create a session over an already-connected stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            next_request_id: 0,
            state: State::Idle,
        }
    }

    /// Whether the session can still perform round trips
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Idle && self.stream.is_some()
    }

    /// Request id the next round trip will use
    #[must_use]
    pub const fn next_request_id(&self) -> u32 {
        self.next_request_id
    }

    /// Resolve a command name and perform one round trip
    ///
    /// Unknown commands fail with [`Error::UnknownCommand`] before any I/O.
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn send_command(&mut self, input: &str) -> Result<RoundTrip> {
        self.send_command_with(input, &CommandDefaults::default())
    }

    /// Like [`Session::send_command`] with caller-supplied defaults
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn send_command_with(
        &mut self,
        input: &str,
        defaults: &CommandDefaults,
    ) -> Result<RoundTrip> {
        let request = command::resolve_with(input, defaults)?;
        self.send_request(request)
    }

    /// Perform one synchronous request/reply round trip
    ///
    /// # Errors
    ///
    /// - [`Error::SessionClosed`] if the session was closed or a previous
    ///   round trip was abandoned midway.
    /// - Framing errors ([`Error::MalformedFrame`], [`Error::ConnectionClosed`],
    ///   [`Error::Io`]) close the session; reconnection is the caller's call.
    /// - Payload codec errors are returned for this reply only; the session
    ///   stays usable for the next request.
    #[instrument(level = "debug", skip(self))]
    pub fn send_request(&mut self, request: Request) -> Result<RoundTrip> {
        match self.state {
            State::Idle => {}
            // AwaitingReply outside a call means a round trip was abandoned;
            // the stream position is indeterminate.
            State::AwaitingReply | State::Closed => return Err(Error::SessionClosed),
        }

        let request_id = self.next_request_id;
        let frame = request.to_frame(request_id)?;

        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.state = State::AwaitingReply;

        match self.round_trip(&frame) {
            Ok(round_trip) => {
                self.state = State::Idle;
                debug!(
                    request_id,
                    echoed_id = round_trip.echoed_id,
                    "round trip complete"
                );
                Ok(round_trip)
            }
            Err(e) if e.is_connection_fatal() => {
                debug!(request_id, error = %e, "round trip failed, closing session");
                self.stream = None;
                self.state = State::Closed;
                Err(e)
            }
            // Decode failure: the reply frame was fully consumed, the
            // stream is still aligned on a frame boundary.
            Err(e) => {
                self.state = State::Idle;
                Err(e)
            }
        }
    }

    fn round_trip(&mut self, frame: &Frame) -> Result<RoundTrip> {
        let stream = self.stream.as_mut().ok_or(Error::SessionClosed)?;
        protocol::write_frame(stream, frame)?;
        let reply_frame = protocol::read_frame(stream)?;
        let reply = Reply::decode(&reply_frame)?;
        Ok(RoundTrip {
            request_id: frame.request_id(),
            echoed_id: reply_frame.request_id(),
            reply,
        })
    }

    /// Release the stream; subsequent calls fail with [`Error::SessionClosed`]
    pub fn close(&mut self) {
        self.stream = None;
        self.state = State::Closed;
    }

    // Typed convenience calls, one per request in the catalogue.

    /// Send a keep-alive
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn idle(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::Idle)
    }

    /// Query the application version
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn get_version(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::GetVersion)
    }

    /// Query the common telemetry record
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn get_telemetry(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::GetTelemetry)
    }

    /// Query the number of coasters
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn get_coaster_count(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::GetCoasterCount)
    }

    /// Query the name of a coaster
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn get_coaster_name(&mut self, coaster: i32) -> Result<RoundTrip> {
        self.send_request(Request::GetCoasterName { coaster })
    }

    /// Query the current coaster and nearest station indices
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn get_current_coaster_and_nearest_station(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::GetCurrentCoasterAndNearestStation)
    }

    /// Switch the emergency stop of a coaster
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_emergency_stop(&mut self, coaster: i32, enabled: bool) -> Result<RoundTrip> {
        self.send_request(Request::SetEmergencyStop { coaster, enabled })
    }

    /// Query the state flags of a station
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn get_station_state(&mut self, coaster: i32, station: i32) -> Result<RoundTrip> {
        self.send_request(Request::GetStationState { coaster, station })
    }

    /// Switch a station between manual and automatic mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_manual_mode(
        &mut self,
        coaster: i32,
        station: i32,
        enabled: bool,
    ) -> Result<RoundTrip> {
        self.send_request(Request::SetManualMode {
            coaster,
            station,
            enabled,
        })
    }

    /// Dispatch a train in manual mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn dispatch(&mut self, coaster: i32, station: i32) -> Result<RoundTrip> {
        self.send_request(Request::Dispatch { coaster, station })
    }

    /// Open or close station gates in manual mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_gates(&mut self, coaster: i32, station: i32, open: bool) -> Result<RoundTrip> {
        self.send_request(Request::SetGates {
            coaster,
            station,
            open,
        })
    }

    /// Open or close harnesses in manual mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_harness(&mut self, coaster: i32, station: i32, open: bool) -> Result<RoundTrip> {
        self.send_request(Request::SetHarness {
            coaster,
            station,
            open,
        })
    }

    /// Raise or lower the station platform in manual mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_platform(&mut self, coaster: i32, station: i32, lowered: bool) -> Result<RoundTrip> {
        self.send_request(Request::SetPlatform {
            coaster,
            station,
            lowered,
        })
    }

    /// Lock or unlock the flyer car in manual mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_flyer_car(
        &mut self,
        coaster: i32,
        station: i32,
        unlocked: bool,
    ) -> Result<RoundTrip> {
        self.send_request(Request::SetFlyerCar {
            coaster,
            station,
            unlocked,
        })
    }

    /// Load and start a park
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn load_park(&mut self, path: impl Into<String>, start_paused: bool) -> Result<RoundTrip> {
        self.send_request(Request::LoadPark {
            path: path.into(),
            start_paused,
        })
    }

    /// Close the currently loaded park
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn close_park(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::ClosePark)
    }

    /// Ask the server to quit; the connection is lost afterwards
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn quit_server(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::QuitServer)
    }

    /// Switch the pause state in play mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_pause(&mut self, paused: bool) -> Result<RoundTrip> {
        self.send_request(Request::SetPause { paused })
    }

    /// Stop and restart the current park
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn reset_park(&mut self, start_paused: bool) -> Result<RoundTrip> {
        self.send_request(Request::ResetPark { start_paused })
    }

    /// Select a specific seat
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn select_seat(
        &mut self,
        coaster: i32,
        train: i32,
        car: i32,
        seat: i32,
    ) -> Result<RoundTrip> {
        self.send_request(Request::SelectSeat {
            coaster,
            train,
            car,
            seat,
        })
    }

    /// Enable or disable attraction mode
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_attraction_mode(&mut self, enabled: bool) -> Result<RoundTrip> {
        self.send_request(Request::SetAttractionMode { enabled })
    }

    /// Recenter VR
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn recenter_vr(&mut self) -> Result<RoundTrip> {
        self.send_request(Request::RecenterVr)
    }

    /// Set a custom fly/walk view
    ///
    /// # Errors
    ///
    /// See [`Session::send_request`].
    pub fn set_custom_view(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        azimuth: f32,
        elevation: f32,
        walk_view: bool,
    ) -> Result<RoundTrip> {
        self.send_request(Request::SetCustomView {
            x,
            y,
            z,
            azimuth,
            elevation,
            walk_view,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read, Write};

    use crate::protocol::{Frame, MessageType, write_frame};

    use super::*;

    /// A scripted stream: replies are read from a pre-built buffer, writes
    /// are captured for inspection.
    struct ScriptedStream {
        replies: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl ScriptedStream {
        fn new(replies: Vec<Frame>) -> Self {
            let mut buf = Vec::new();
            for frame in &replies {
                write_frame(&mut buf, frame).unwrap();
            }
            Self {
                replies: Cursor::new(buf),
                written: Vec::new(),
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.replies.read(buf)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_request_ids_increment_in_call_order() {
        let stream = ScriptedStream::new(vec![
            Frame::new(MessageType::Ok, 0, vec![]),
            Frame::new(MessageType::Ok, 1, vec![]),
        ]);
        let mut session = Session::new(stream);

        let first = session.send_command("idle").unwrap();
        let second = session.send_command("idle").unwrap();

        assert_eq!(first.request_id, 0);
        assert_eq!(second.request_id, 1);
        assert_eq!(second.request_id - first.request_id, 1);
        assert_eq!(first.reply, Reply::Ok);
        assert_eq!(second.reply, Reply::Ok);
    }

    #[test]
    fn test_unknown_command_performs_no_io() {
        let stream = ScriptedStream::new(vec![]);
        let mut session = Session::new(stream);

        let result = session.send_command("boguscmd");
        assert!(matches!(result, Err(Error::UnknownCommand { .. })));

        // No bytes written, counter untouched, session still open.
        assert!(session.stream.as_ref().unwrap().written.is_empty());
        assert_eq!(session.next_request_id(), 0);
        assert!(session.is_open());
    }

    #[test]
    fn test_truncated_reply_poisons_session() {
        let mut stream = ScriptedStream::new(vec![]);
        // Half a header, then EOF.
        stream.replies = Cursor::new(vec![b'N', 0, 1]);
        let mut session = Session::new(stream);

        let result = session.send_request(Request::Idle);
        assert!(matches!(result, Err(Error::ConnectionClosed)));

        let result = session.send_request(Request::Idle);
        assert!(matches!(result, Err(Error::SessionClosed)));
    }

    #[test]
    fn test_decode_error_keeps_session_usable() {
        let stream = ScriptedStream::new(vec![
            // Telemetry reply with a wrong payload size, then a good reply.
            Frame::new(MessageType::Telemetry, 0, vec![0u8; 12]),
            Frame::new(MessageType::Ok, 1, vec![]),
        ]);
        let mut session = Session::new(stream);

        let result = session.get_telemetry();
        assert!(matches!(result, Err(Error::BadTelemetrySize { size: 12 })));
        assert!(session.is_open());

        let round_trip = session.idle().unwrap();
        assert_eq!(round_trip.reply, Reply::Ok);
        assert_eq!(round_trip.request_id, 1);
    }

    #[test]
    fn test_close_releases_stream() {
        let stream = ScriptedStream::new(vec![Frame::new(MessageType::Ok, 0, vec![])]);
        let mut session = Session::new(stream);
        session.close();

        assert!(!session.is_open());
        assert!(matches!(
            session.send_command("idle"),
            Err(Error::SessionClosed)
        ));
    }

    #[test]
    fn test_server_error_reply_is_data() {
        let stream = ScriptedStream::new(vec![Frame::new(
            MessageType::Error,
            0,
            b"Not in play mode".to_vec(),
        )]);
        let mut session = Session::new(stream);

        let round_trip = session.dispatch(0, 0).unwrap();
        assert_eq!(
            round_trip.reply,
            Reply::Error(Some("Not in play mode".to_owned()))
        );
        assert!(session.is_open());
    }

    #[test]
    fn test_written_request_frame_layout() {
        let stream = ScriptedStream::new(vec![Frame::new(MessageType::IntValue, 0, vec![0; 4])]);
        let mut session = Session::new(stream);
        session.get_coaster_count().unwrap();

        let written = &session.stream.as_ref().unwrap().written;
        let frame = Frame::decode(written).unwrap();
        assert_eq!(frame.message_type(), Some(MessageType::GetCoasterCount));
        assert_eq!(frame.request_id(), 0);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_echoed_id_is_reported_not_validated() {
        // Server echoes a different id; order-based matching keeps going.
        let stream = ScriptedStream::new(vec![Frame::new(MessageType::Ok, 99, vec![])]);
        let mut session = Session::new(stream);

        let round_trip = session.idle().unwrap();
        assert_eq!(round_trip.request_id, 0);
        assert_eq!(round_trip.echoed_id, 99);
    }
}
