//! # Constants and type definitions for colocate
//!
//! This module centralizes the **geodetic constants**, **time conversion factors**, and **common
//! type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Earth circumferences used by the local tangent-plane projection
//! - Mean Earth radius used by the haversine distance
//! - Serial-day epoch offsets (days since 1899-12-30 UTC)
//! - Unit aliases (`Degree`, `Meter`, `Second`) and the entity identifier type
//!
//! These definitions are shared by the projection, tiling, detection, and graph modules.

// -------------------------------------------------------------------------------------------------
// Geodetic constants
// -------------------------------------------------------------------------------------------------

/// Earth circumference along the equator, in meters.
pub const EQUATOR_CIRCUMFERENCE_M: f64 = 40_075_160.0;

/// Earth circumference through the poles, in meters.
///
/// Used as a constant meters-per-degree-of-latitude scale (flattening is ignored).
pub const POLAR_CIRCUMFERENCE_M: f64 = 40_008_000.0;

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = POLAR_CIRCUMFERENCE_M / 360.0;

// -------------------------------------------------------------------------------------------------
// Time constants
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a civil day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial day number of 1970-01-01T00:00:00 UTC, counted from 1899-12-30T00:00:00 UTC.
pub const UNIX_EPOCH_SERIAL_DAY: f64 = 25_569.0;

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Default projection origin latitude (degrees), south-west corner of the Beijing study area.
pub const DEFAULT_ORIGIN_LAT: Degree = 39.75872;

/// Default projection origin longitude (degrees).
pub const DEFAULT_ORIGIN_LON: Degree = 116.04142;

/// Default spatial threshold / tile size (meters).
pub const DEFAULT_DS: Meter = 100.0;

/// Default temporal threshold / tile size (seconds).
pub const DEFAULT_DT: Second = 300.0;

/// Tiles whose candidate pairs are extracted together before being folded into a graph.
pub const TILE_BATCH: usize = 256;

/// Entity pairs scanned together by the parallel exhaustive search.
pub const PAIR_BATCH: usize = 64;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in meters
pub type Meter = f64;
/// Duration or absolute time in seconds
pub type Second = f64;
/// Elapsed days since the serial-day epoch (1899-12-30 UTC)
pub type SerialDay = f64;

/// Identifier of a tracked entity (e.g. the Geolife user directory name `"000"`).
pub type EntityId = String;
