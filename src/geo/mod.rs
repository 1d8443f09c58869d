//! Geographic primitives and great-circle calculations.
//!
//! This module provides everything qibla knows about the Earth's surface:
//!
//! ## Module Structure
//!
//! - [`coordinate`]: the validated `GeoCoordinate` value type
//! - [`geodesy`]: pure bearing and haversine distance functions and the
//!   `QiblaSolution` they produce
//! - [`display`]: cardinal directions, fix quality grading and formatting
//!
//! ## Key Properties
//!
//! - **Total functions**: bearing and distance never fail for valid coordinates.
//!   Validation happens once, when a `GeoCoordinate` is built.
//! - **Deterministic**: identical inputs always produce bit-identical outputs,
//!   there is no hidden state or caching.
//! - **Injected target**: the destination point is a parameter. The Kaaba is the
//!   default supplied by configuration, not something the math assumes.

pub mod coordinate;
pub mod display;
pub mod geodesy;

pub use coordinate::{CoordinateError, GeoCoordinate};
pub use display::{FixQuality, cardinal_direction, format_coordinate};
pub use geodesy::{QiblaSolution, compute_bearing, compute_distance_km, solve};
