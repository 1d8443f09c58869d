//! # Qibla Library
//!
//! Qibla direction engine behind the `qibla` binary.
//!
//! The library computes the great-circle bearing and distance from a location
//! fix to the Kaaba and follows a live compass heading against that bearing,
//! reporting alignment as the user turns to face it.
//!
//! ## Architecture
//!
//! - **Geodesy**: `geo` holds validated coordinates and the pure bearing and
//!   distance functions
//! - **Heading pipeline**: `heading` normalizes raw orientation events,
//!   `alignment` compares headings to the bearing and reports each entry into
//!   alignment once
//! - **Permission and fallback**: `permission` models the platform prompt,
//!   `simulator` produces a rotating heading when no compass data arrives
//! - **Session**: `session` owns one compass-screen activation and serializes
//!   every event through a single channel
//! - **Collaborators**: `providers` defines where fixes and orientation events
//!   come from, `time_source` abstracts the clock for tests
//! - **Infrastructure**: `config`, `args`, `commands`, `signals` and the shared
//!   logger in `common`

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod alignment;
pub mod args;
pub mod commands;
pub mod config;
pub mod events;
pub mod geo;
pub mod heading;
pub mod permission;
pub mod providers;
pub mod session;
pub mod signals;
pub mod simulator;
pub mod time_source;

pub use alignment::{AccuracyBand, AlignmentState, AlignmentTracker};
pub use geo::{GeoCoordinate, QiblaSolution, solve};
pub use heading::{HeadingSample, HeadingSource, RawOrientationEvent};
pub use permission::PermissionState;
pub use providers::{
    FixOptions, LocationError, LocationFix, LocationProvider, OrientationProvider, Subscription,
};
pub use session::{EngineSettings, QiblaSession, QiblaSnapshot};
pub use time_source::{ManualTimeSource, RealTimeSource, TimeSource};
