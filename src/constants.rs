//! # Constants and type definitions for Astris
//!
//! This module centralizes the **defaults**, **synthetic records** and **common type
//! definitions** used throughout the `astris` crate.
//!
//! ## Overview
//!
//! - Type aliases for distances and positions (all in parsecs)
//! - Identity of the synthetic Earth / Solar System records injected before parsing
//! - Default sizes for caches, buffers and search results
//! - Hash map alias used by the slug indexes

use ahash::RandomState;
use nalgebra::Vector3;
use std::collections::HashMap;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Distance in parsecs
pub type Parsec = f64;

/// Position in the shared heliocentric Cartesian frame, in parsecs
pub type Coordinate = Vector3<Parsec>;

/// URL-safe identity of a planet or a host system
pub type Slug = String;

/// Fast hash map used for the slug indexes
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

// -------------------------------------------------------------------------------------------------
// Synthetic records
// -------------------------------------------------------------------------------------------------

/// Slug of the synthetic Earth planet, always present in the catalog
pub const EARTH_SLUG: &str = "earth";

/// Display name of the synthetic Earth planet
pub const EARTH_NAME: &str = "Earth";

/// Slug of the synthetic Solar System host
pub const SOLAR_SYSTEM_SLUG: &str = "solar-system";

/// Display name of the synthetic Solar System host
pub const SOLAR_SYSTEM_NAME: &str = "Solar System";

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Number of distinct references remembered by each relocalization cache
pub const DEFAULT_CACHE_CAPACITY: usize = 3;

/// Maximum number of ranked matches returned by a search query
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

/// Initial capacity (in elements) of the growable star buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Timeout applied to every remote fetch, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Exponent of the magnitude → grayscale brightness curve
pub const COLOR_EXPONENT: f32 = -1.2;

/// Magnitudes below this floor are clamped before the brightness curve is applied,
/// keeping the power law finite for very bright (zero or negative magnitude) stars.
pub const MIN_COLOR_MAGNITUDE: f32 = 0.5;

/// Default location of the waypoint table
pub const DEFAULT_WAYPOINTS_SOURCE: &str = "public/waypoints.csv";

/// Default location of the binary star catalog
pub const DEFAULT_STARS_SOURCE: &str = "public/stars.pb";
