//! # Relocalization of stars and host systems
//!
//! The catalog stores absolute positions in a shared heliocentric frame. To render the sky
//! (or the navigation waypoints) seen from an exoplanet, every position is re-expressed as a
//! displacement from a chosen reference:
//!
//! ```text
//! displacement = position − reference
//! ```
//!
//! Two flavours exist:
//!
//! * **System relocalization** ([`relocalize_systems`]) – every host system except the
//!   reference planet's own host, with its displacement. A planet never needs its own
//!   system as a waypoint.
//! * **Star relocalization** ([`relocalize_stars`]) – every star, with its displacement and a
//!   grayscale color derived from its magnitude ([`star_color`]).
//!
//! Both are single linear passes writing into preallocated flat `f32` buffers; no per-star
//! allocation happens. [`Localizer`] memoizes both per reference identity in bounded
//! [`RecencyCache`]s: a hit returns the very same [`Arc`] as the first computation.
//!
//! ## Identity, not equality
//! -----------------
//! Cache keys are [`ReferenceKey`]s. Two [`ReferencePoint`](crate::reference::ReferencePoint)s
//! built at the same coordinates are two keys and are computed twice.
pub mod recency_cache;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    constants::{Coordinate, COLOR_EXPONENT, MIN_COLOR_MAGNITUDE},
    reference::{Reference, ReferenceKey},
    stars::StarField,
    waypoints::{CatalogIndex, HostSystem, Planet, SystemId},
};

use recency_cache::{CacheStats, RecencyCache};

/// Host systems seen from a planet.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedSystems {
    /// Systems in index order, the reference planet's host excluded
    pub systems: Vec<SystemId>,
    /// `[dx, dy, dz]` per system, parsecs
    pub displacements: Vec<f32>,
    pub count: usize,
}

/// Stars seen from a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedStars {
    /// `[dx, dy, dz]` per star, parsecs
    pub displacements: Vec<f32>,
    /// `[r, g, b]` per star, grayscale
    pub colors: Vec<f32>,
    pub count: usize,
}

/// Grayscale intensity of a star of the given catalog magnitude.
///
/// Follows `magnitude^-1.2`: a larger (fainter) magnitude gives a lower value. Magnitudes
/// below [`MIN_COLOR_MAGNITUDE`] are clamped so the curve stays finite. Values above `1.0`
/// are kept, so the brightest stars stay ordered; the renderer saturates them.
#[inline]
pub fn star_color(magnitude: f32) -> f32 {
    magnitude.max(MIN_COLOR_MAGNITUDE).powf(COLOR_EXPONENT)
}

/// Displacements of every host system except `planet`'s own, relative to `planet`.
///
/// Arguments
/// -----------------
/// * `index`: the catalog tables.
/// * `planet`: the reference planet.
///
/// Return
/// ----------
/// * The filtered systems (index order) with their flat displacement buffer. A planet of
///   another index has no host here, so no system is excluded.
pub fn relocalize_systems(index: &CatalogIndex, planet: &Planet) -> LocalizedSystems {
    let own_host = index.host_of(planet).map(HostSystem::id);
    let origin = planet.coordinate();

    let capacity = index.system_count() - usize::from(own_host.is_some());
    let mut systems = Vec::with_capacity(capacity);
    let mut displacements = Vec::with_capacity(capacity * 3);

    for system in index.systems().iter().filter(|s| Some(s.id()) != own_host) {
        let d = system.coordinate() - origin;
        displacements.extend_from_slice(&[d.x as f32, d.y as f32, d.z as f32]);
        systems.push(system.id());
    }

    LocalizedSystems {
        count: systems.len(),
        systems,
        displacements,
    }
}

/// Displacements and colors of every star, relative to `origin`.
///
/// Arguments
/// -----------------
/// * `stars`: the star buffers.
/// * `origin`: the reference position, parsecs.
///
/// Return
/// ----------
/// * Exactly `stars.len()` displacements and colors, in catalog order.
pub fn relocalize_stars(stars: &StarField, origin: &Coordinate) -> LocalizedStars {
    let count = stars.len();
    let mut displacements = Vec::with_capacity(count * 3);
    let mut colors = Vec::with_capacity(count * 3);

    for (position, &magnitude) in stars.positions().chunks_exact(3).zip(stars.magnitudes()) {
        displacements.extend_from_slice(&[
            (position[0] as f64 - origin.x) as f32,
            (position[1] as f64 - origin.y) as f32,
            (position[2] as f64 - origin.z) as f32,
        ]);
        let intensity = star_color(magnitude);
        colors.extend_from_slice(&[intensity, intensity, intensity]);
    }

    LocalizedStars {
        displacements,
        colors,
        count,
    }
}

/// Memoizing front-end of the relocalization passes.
#[derive(Debug)]
pub struct Localizer {
    systems: Mutex<RecencyCache<ReferenceKey, Arc<LocalizedSystems>>>,
    stars: Mutex<RecencyCache<ReferenceKey, Arc<LocalizedStars>>>,
    system_passes: AtomicU64,
    star_passes: AtomicU64,
}

impl Localizer {
    /// Arguments
    /// -----------------
    /// * `system_capacity`: distinct planets remembered for system relocalization.
    /// * `star_capacity`: distinct references remembered for star relocalization.
    pub fn new(system_capacity: usize, star_capacity: usize) -> Self {
        Localizer {
            systems: Mutex::new(RecencyCache::new(system_capacity)),
            stars: Mutex::new(RecencyCache::new(star_capacity)),
            system_passes: AtomicU64::new(0),
            star_passes: AtomicU64::new(0),
        }
    }

    /// Systems relative to `planet`, from cache when `planet` was used recently.
    pub fn systems_relative_to(
        &self,
        index: &CatalogIndex,
        planet: &Planet,
    ) -> Arc<LocalizedSystems> {
        let mut cache = self.systems.lock();
        cache.get_or_insert_with(planet.reference_key(), || {
            self.system_passes.fetch_add(1, Ordering::Relaxed);
            let result = relocalize_systems(index, planet);
            debug!(planet = planet.slug(), systems = result.count, "systems relocalized");
            Arc::new(result)
        })
    }

    /// Stars relative to `reference`, from cache when the same reference was used recently.
    pub fn stars_relative_to<R: Reference + ?Sized>(
        &self,
        stars: &StarField,
        reference: &R,
    ) -> Arc<LocalizedStars> {
        let key = reference.reference_key();
        let mut cache = self.stars.lock();
        cache.get_or_insert_with(key, || {
            self.star_passes.fetch_add(1, Ordering::Relaxed);
            let result = relocalize_stars(stars, &reference.position());
            debug!(?key, stars = result.count, "stars relocalized");
            Arc::new(result)
        })
    }

    /// Number of system relocalization passes actually computed.
    pub fn system_passes(&self) -> u64 {
        self.system_passes.load(Ordering::Relaxed)
    }

    /// Number of star relocalization passes actually computed.
    pub fn star_passes(&self) -> u64 {
        self.star_passes.load(Ordering::Relaxed)
    }

    pub fn system_cache_stats(&self) -> CacheStats {
        self.systems.lock().stats()
    }

    pub fn star_cache_stats(&self) -> CacheStats {
        self.stars.lock().stats()
    }
}
