//! Command table mapping human-readable names to typed requests
//!
//! Each command has a canonical long name, an optional short alias, and a
//! pure builder producing the request. Domain defaults (first coaster and
//! station, demo park path, the demo custom-view pose) live in
//! [`CommandDefaults`] instead of being buried in the builders. Resolution
//! performs no I/O.

use crate::protocol::{Error, Request, Result};

/// Default parameters used by command builders
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefaults {
    /// Coaster index
    pub coaster: i32,
    /// Station index
    pub station: i32,
    /// Train index
    pub train: i32,
    /// Car index
    pub car: i32,
    /// Seat index for `changeseat`
    pub seat: i32,
    /// Park file path for `loadpark` / `loadparkpaused`
    pub park_path: String,
    /// Custom-view position in meters (x, y, z)
    pub view_position: [f32; 3],
    /// Custom-view azimuth in degrees (0 = north)
    pub view_azimuth: f32,
    /// Custom-view elevation in degrees
    pub view_elevation: f32,
    /// Custom-view walk view instead of fly view
    pub view_walk: bool,
}

impl Default for CommandDefaults {
    fn default() -> Self {
        Self {
            coaster: 0,
            station: 0,
            train: 0,
            car: 0,
            // Second seat, same as the reference client demo.
            seat: 1,
            park_path: "intern:parks/Contributed/Fenrir.nl2pkg".to_owned(),
            view_position: [10.0, 3.0, 100.0],
            view_azimuth: 90.0,
            view_elevation: 43.0,
            view_walk: false,
        }
    }
}

/// One entry of the command table
pub struct CommandSpec {
    /// Canonical long name
    pub name: &'static str,
    /// Short alias, if the command has one
    pub alias: Option<&'static str>,
    /// One-line description for help output
    pub help: &'static str,
    build: fn(&CommandDefaults) -> Request,
}

impl CommandSpec {
    /// Build the request for this command from the given defaults
    #[must_use]
    pub fn build(&self, defaults: &CommandDefaults) -> Request {
        (self.build)(defaults)
    }

    /// Whether the given input names this command
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.name == input || self.alias == Some(input)
    }
}

/// The static command table
static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "idle",
        alias: Some("i"),
        help: "Send idle message",
        build: |_| Request::Idle,
    },
    CommandSpec {
        name: "getversion",
        alias: Some("gv"),
        help: "Query server version",
        build: |_| Request::GetVersion,
    },
    CommandSpec {
        name: "gettelemetry",
        alias: Some("gt"),
        help: "Query telemetry data",
        build: |_| Request::GetTelemetry,
    },
    CommandSpec {
        name: "getcoastercount",
        alias: Some("gcc"),
        help: "Query number of coasters",
        build: |_| Request::GetCoasterCount,
    },
    CommandSpec {
        name: "getcoastername",
        alias: Some("gcn"),
        help: "Query name of the default coaster",
        build: |d| Request::GetCoasterName { coaster: d.coaster },
    },
    CommandSpec {
        name: "getcurrentcoasterandneareststation",
        alias: Some("gccns"),
        help: "Query current coaster index and nearest station",
        build: |_| Request::GetCurrentCoasterAndNearestStation,
    },
    CommandSpec {
        name: "setemergencystopon",
        alias: Some("seon"),
        help: "Enable e-stop on the default coaster",
        build: |d| Request::SetEmergencyStop {
            coaster: d.coaster,
            enabled: true,
        },
    },
    CommandSpec {
        name: "setemergencystopoff",
        alias: Some("seoff"),
        help: "Disable e-stop on the default coaster",
        build: |d| Request::SetEmergencyStop {
            coaster: d.coaster,
            enabled: false,
        },
    },
    CommandSpec {
        name: "getstationstate",
        alias: Some("gss"),
        help: "Query state of the default station",
        build: |d| Request::GetStationState {
            coaster: d.coaster,
            station: d.station,
        },
    },
    CommandSpec {
        name: "setstationmanualmodeon",
        alias: Some("setsmmon"),
        help: "Enable manual mode of the default station",
        build: |d| Request::SetManualMode {
            coaster: d.coaster,
            station: d.station,
            enabled: true,
        },
    },
    CommandSpec {
        name: "setstationmanualmodeoff",
        alias: Some("setsmmoff"),
        help: "Disable manual mode of the default station",
        build: |d| Request::SetManualMode {
            coaster: d.coaster,
            station: d.station,
            enabled: false,
        },
    },
    CommandSpec {
        name: "dispatch",
        alias: Some("d"),
        help: "Dispatch train in the default station",
        build: |d| Request::Dispatch {
            coaster: d.coaster,
            station: d.station,
        },
    },
    CommandSpec {
        name: "stationgatesclose",
        alias: Some("sgc"),
        help: "Close gates in the default station",
        build: |d| Request::SetGates {
            coaster: d.coaster,
            station: d.station,
            open: false,
        },
    },
    CommandSpec {
        name: "stationgatesopen",
        alias: Some("sgo"),
        help: "Open gates in the default station",
        build: |d| Request::SetGates {
            coaster: d.coaster,
            station: d.station,
            open: true,
        },
    },
    CommandSpec {
        name: "stationharnessclose",
        alias: Some("shc"),
        help: "Close harnesses in the default station",
        build: |d| Request::SetHarness {
            coaster: d.coaster,
            station: d.station,
            open: false,
        },
    },
    CommandSpec {
        name: "stationharnessopen",
        alias: Some("sho"),
        help: "Open harnesses in the default station",
        build: |d| Request::SetHarness {
            coaster: d.coaster,
            station: d.station,
            open: true,
        },
    },
    CommandSpec {
        name: "stationplatformraise",
        alias: Some("spr"),
        help: "Raise platform in the default station",
        build: |d| Request::SetPlatform {
            coaster: d.coaster,
            station: d.station,
            lowered: false,
        },
    },
    CommandSpec {
        name: "stationplatformlower",
        alias: Some("spl"),
        help: "Lower platform in the default station",
        build: |d| Request::SetPlatform {
            coaster: d.coaster,
            station: d.station,
            lowered: true,
        },
    },
    CommandSpec {
        name: "stationflyercarlock",
        alias: Some("sfl"),
        help: "Lock flyer car in the default station",
        build: |d| Request::SetFlyerCar {
            coaster: d.coaster,
            station: d.station,
            unlocked: false,
        },
    },
    CommandSpec {
        name: "stationflyercarunlock",
        alias: Some("sfu"),
        help: "Unlock flyer car in the default station",
        build: |d| Request::SetFlyerCar {
            coaster: d.coaster,
            station: d.station,
            unlocked: true,
        },
    },
    CommandSpec {
        name: "loadpark",
        alias: None,
        help: "Load the default park in running state",
        build: |d| Request::LoadPark {
            path: d.park_path.clone(),
            start_paused: false,
        },
    },
    CommandSpec {
        name: "loadparkpaused",
        alias: None,
        help: "Load the default park in paused state",
        build: |d| Request::LoadPark {
            path: d.park_path.clone(),
            start_paused: true,
        },
    },
    CommandSpec {
        name: "closepark",
        alias: None,
        help: "Close the current park",
        build: |_| Request::ClosePark,
    },
    CommandSpec {
        name: "quitserver",
        alias: None,
        help: "Request the server to quit",
        build: |_| Request::QuitServer,
    },
    CommandSpec {
        name: "pause",
        alias: None,
        help: "Activate pause",
        build: |_| Request::SetPause { paused: true },
    },
    CommandSpec {
        name: "unpause",
        alias: None,
        help: "Deactivate pause",
        build: |_| Request::SetPause { paused: false },
    },
    CommandSpec {
        name: "resetpark",
        alias: None,
        help: "Restart the current park in paused state",
        build: |_| Request::ResetPark { start_paused: true },
    },
    CommandSpec {
        name: "changeseat",
        alias: None,
        help: "Select the default seat",
        build: |d| Request::SelectSeat {
            coaster: d.coaster,
            train: d.train,
            car: d.car,
            seat: d.seat,
        },
    },
    CommandSpec {
        name: "attractionmode",
        alias: None,
        help: "Enable attraction mode",
        build: |_| Request::SetAttractionMode { enabled: true },
    },
    CommandSpec {
        name: "recentervr",
        alias: None,
        help: "Recenter VR",
        build: |_| Request::RecenterVr,
    },
    CommandSpec {
        name: "setcustomview",
        alias: None,
        help: "Set the default custom view",
        build: |d| Request::SetCustomView {
            x: d.view_position[0],
            y: d.view_position[1],
            z: d.view_position[2],
            azimuth: d.view_azimuth,
            elevation: d.view_elevation,
            walk_view: d.view_walk,
        },
    },
];

/// Iterate over all commands, e.g. for help output
pub fn commands() -> impl Iterator<Item = &'static CommandSpec> {
    COMMANDS.iter()
}

/// Resolve a command name with the standard defaults
///
/// # Errors
///
/// Returns [`Error::UnknownCommand`] if the input names no command.
pub fn resolve(input: &str) -> Result<Request> {
    resolve_with(input, &CommandDefaults::default())
}

/// Resolve a command name with caller-supplied defaults
///
/// # Errors
///
/// Returns [`Error::UnknownCommand`] if the input names no command.
pub fn resolve_with(input: &str, defaults: &CommandDefaults) -> Result<Request> {
    let input = input.trim();
    COMMANDS
        .iter()
        .find(|spec| spec.matches(input))
        .map(|spec| spec.build(defaults))
        .ok_or_else(|| Error::UnknownCommand {
            name: input.to_owned(),
        })
}
