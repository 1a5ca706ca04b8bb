//! # Reference points for relocalization
//!
//! Relocalization results are memoized per **reference identity**, not per position: two
//! reference points at the same coordinates are still two cache entries. Identity is carried
//! by a [`ReferenceKey`]:
//!
//! - a catalog planet is identified by its [`PlanetId`] handle together with the id of the
//!   index that built it; both are stable since the planet table never changes after
//!   loading;
//! - an explicit [`ReferencePoint`] receives a fresh id from a process-wide counter when it is
//!   constructed. Cloning a `ReferencePoint` keeps its id, constructing a new one never does.
//!
//! The [`Reference`] trait is the seam used by the localization engine: anything exposing a
//! key and a position can be used as the origin of a relocalization.
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{constants::Coordinate, waypoints::PlanetId};

static NEXT_POINT_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a reference for cache purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKey {
    Planet { index: u64, planet: PlanetId },
    Point(u64),
}

/// Something a catalog can be relocalized around.
pub trait Reference {
    /// Identity used to memoize relocalization results.
    fn reference_key(&self) -> ReferenceKey;

    /// Position of the reference, in parsecs.
    fn position(&self) -> Coordinate;
}

/// A free-standing reference point with its own identity.
#[derive(Debug, Clone)]
pub struct ReferencePoint {
    id: u64,
    coordinate: Coordinate,
}

impl ReferencePoint {
    pub fn new(coordinate: Coordinate) -> Self {
        ReferencePoint {
            id: NEXT_POINT_ID.fetch_add(1, Ordering::Relaxed),
            coordinate,
        }
    }

    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(Coordinate::new(x, y, z))
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

impl Reference for ReferencePoint {
    fn reference_key(&self) -> ReferenceKey {
        ReferenceKey::Point(self.id)
    }

    fn position(&self) -> Coordinate {
        self.coordinate
    }
}
