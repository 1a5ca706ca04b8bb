//! # Waypoints: planets, host systems and their indexes
//!
//! A *waypoint* is anything the explorer can navigate to: an exoplanet or the host system it
//! orbits. This module holds the typed records and the [`CatalogIndex`] tying them together.
//!
//! Modules
//! -----------------
//! * [`waypoint_row`] – Fixed-field CSV row schema with trimming/coercion of every column.
//! * [`waypoint_reader`] – Streaming CSV reader filling a [`CatalogIndex`].
//! * [`slug`] – Derivation of URL-safe slugs from display names.
//!
//! Data Model
//! -----------------
//! * [`Planet`] and [`HostSystem`] live in two flat tables owned by [`CatalogIndex`].
//! * They refer to each other through [`PlanetId`] / [`SystemId`] handles (indices into those
//!   tables), so navigation is O(1) both ways without reference cycles.
//! * Two slug indexes (`FastHashMap<Slug, _>`) resolve lookups by slug.
//!
//! Invariants
//! -----------------
//! * Every planet's `host` resolves to a system whose `planets` list contains that planet.
//! * Records are read-only once indexed and remember which index built them, so a record
//!   from another index never resolves here.
//! * A host slug maps to exactly one [`HostSystem`]; the first row naming a host creates it.
//! * A synthetic Earth planet in a synthetic Solar System host (both at the origin) is always
//!   present, so a reference point can always be resolved.
pub mod slug;
pub mod waypoint_reader;
pub mod waypoint_row;

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    constants::{
        Coordinate, FastHashMap, Parsec, Slug, EARTH_NAME, EARTH_SLUG, SOLAR_SYSTEM_NAME,
        SOLAR_SYSTEM_SLUG,
    },
    reference::{Reference, ReferenceKey},
    search::{EntryKind, SearchEntry},
};

use waypoint_row::WaypointRow;

static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(0);

/// Handle of a [`Planet`] inside a [`CatalogIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanetId(pub(crate) usize);

/// Handle of a [`HostSystem`] inside a [`CatalogIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) usize);

impl PlanetId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl SystemId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// How and when a planet was discovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryInfo {
    pub year: Option<i32>,
    pub method: Option<String>,
    pub facility: Option<String>,
    /// Raw reference column, an HTML anchor pointing to the discovery paper
    pub reference_link: Option<String>,
}

/// Size and mass of a planet, relative to Earth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalMetrics {
    pub radius_rel_earth: Option<f64>,
    pub mass_rel_earth: Option<f64>,
    /// Provenance of the mass estimate (e.g. `"Mass"`, `"Msini"`)
    pub mass_provenance: Option<String>,
}

/// Orbit of a planet around its host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitalMetrics {
    /// Orbital period in Earth days
    pub period_days: Option<f64>,
    /// Semi-major axis in astronomical units
    pub semi_major_axis_au: Option<f64>,
    pub eccentricity: Option<f64>,
}

/// Link and citation extracted from a discovery reference anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperReference {
    pub href: Option<String>,
    pub citation: Option<String>,
}

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b([^>]*)>(.*?)</a>"#).expect("valid anchor regex")
});
static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("valid href regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// An exoplanet (or the synthetic Earth).
///
/// Planets are only built by a [`CatalogIndex`] and are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    id: PlanetId,
    index: u64,
    slug: Slug,
    name: String,
    coordinate: Coordinate,
    host: SystemId,
    distance: Option<Parsec>,
    discovery: DiscoveryInfo,
    physical: PhysicalMetrics,
    orbit: OrbitalMetrics,
}

impl Planet {
    pub fn id(&self) -> PlanetId {
        self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Heliocentric position, parsecs.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Handle of the host system, valid in the index that built this planet.
    pub fn host(&self) -> SystemId {
        self.host
    }

    /// Distance from Earth, in parsecs
    pub fn distance(&self) -> Option<Parsec> {
        self.distance
    }

    pub fn discovery(&self) -> &DiscoveryInfo {
        &self.discovery
    }

    pub fn physical(&self) -> &PhysicalMetrics {
        &self.physical
    }

    pub fn orbit(&self) -> &OrbitalMetrics {
        &self.orbit
    }

    pub fn is_earth(&self) -> bool {
        self.slug == EARTH_SLUG
    }

    /// Route of the planet infographic page.
    pub fn info_route(&self) -> String {
        format!("/planets/{}/info", self.slug)
    }

    /// Extract the discovery paper link and citation from the reference anchor.
    ///
    /// Return
    /// ----------
    /// * `None` when the planet has no reference column or it holds no `<a>` element.
    /// * Otherwise the anchor `href` (if any) and its trimmed text (absent when blank).
    pub fn paper_reference(&self) -> Option<PaperReference> {
        let raw = self.discovery.reference_link.as_deref()?;
        let anchor = ANCHOR_RE.captures(raw)?;

        let href = anchor.get(1).and_then(|attrs| {
            HREF_RE.captures(attrs.as_str()).and_then(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .or_else(|| c.get(3))
                    .map(|m| m.as_str().to_string())
            })
        });

        let citation = anchor
            .get(2)
            .map(|text| TAG_RE.replace_all(text.as_str(), "").trim().to_string())
            .filter(|text| !text.is_empty());

        Some(PaperReference { href, citation })
    }
}

impl Reference for Planet {
    fn reference_key(&self) -> ReferenceKey {
        ReferenceKey::Planet {
            index: self.index,
            planet: self.id,
        }
    }

    fn position(&self) -> Coordinate {
        self.coordinate
    }
}

/// A star system hosting one or more planets.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSystem {
    id: SystemId,
    index: u64,
    slug: Slug,
    name: String,
    coordinate: Coordinate,
    distance: Option<Parsec>,
    num_stars: Option<u32>,
    num_planets: Option<u32>,
    v_magnitude: Option<f64>,
    gaia_magnitude: Option<f64>,
    spectral_type: Option<String>,
    planets: SmallVec<[PlanetId; 4]>,
}

impl HostSystem {
    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the first table row naming this host, parsecs.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn distance(&self) -> Option<Parsec> {
        self.distance
    }

    pub fn num_stars(&self) -> Option<u32> {
        self.num_stars
    }

    pub fn num_planets(&self) -> Option<u32> {
        self.num_planets
    }

    /// V (Johnson) magnitude of the system
    pub fn v_magnitude(&self) -> Option<f64> {
        self.v_magnitude
    }

    /// Gaia G magnitude of the system
    pub fn gaia_magnitude(&self) -> Option<f64> {
        self.gaia_magnitude
    }

    pub fn spectral_type(&self) -> Option<&str> {
        self.spectral_type.as_deref()
    }

    /// Planets of this system, in file order.
    pub fn planet_ids(&self) -> &[PlanetId] {
        &self.planets
    }

    /// Route of the system infographic page.
    pub fn route(&self) -> String {
        format!("/systems/{}", self.slug)
    }
}

/// Outcome of inserting one table row into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Indexed(PlanetId),
    /// The row has no identity, planet name, host name or complete position
    Incomplete,
    /// A planet with the same slug is already indexed
    DuplicatePlanet,
}

/// Planet and host system tables with their slug indexes.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    id: u64,
    planets: Vec<Planet>,
    systems: Vec<HostSystem>,
    planet_by_slug: FastHashMap<Slug, PlanetId>,
    system_by_slug: FastHashMap<Slug, SystemId>,
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogIndex {
    /// Create an index holding only the synthetic Earth and Solar System records.
    pub fn new() -> Self {
        let mut index = CatalogIndex {
            id: NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed),
            planets: Vec::new(),
            systems: Vec::new(),
            planet_by_slug: FastHashMap::default(),
            system_by_slug: FastHashMap::default(),
        };

        let origin = Coordinate::zeros();
        let solar_system = index.insert_system(HostSystem {
            id: SystemId(0),
            index: 0,
            slug: SOLAR_SYSTEM_SLUG.to_string(),
            name: SOLAR_SYSTEM_NAME.to_string(),
            coordinate: origin,
            distance: Some(0.0),
            num_stars: Some(1),
            num_planets: Some(8),
            v_magnitude: None,
            gaia_magnitude: None,
            spectral_type: Some("G2 V".to_string()),
            planets: SmallVec::new(),
        });

        index.insert_planet(Planet {
            id: PlanetId(0),
            index: 0,
            slug: EARTH_SLUG.to_string(),
            name: EARTH_NAME.to_string(),
            coordinate: origin,
            host: solar_system,
            distance: Some(0.0),
            discovery: DiscoveryInfo::default(),
            physical: PhysicalMetrics {
                radius_rel_earth: Some(1.0),
                mass_rel_earth: Some(1.0),
                mass_provenance: None,
            },
            orbit: OrbitalMetrics {
                period_days: Some(365.256),
                semi_major_axis_au: Some(1.0),
                eccentricity: Some(0.0167),
            },
        });

        index
    }

    fn insert_system(&mut self, mut system: HostSystem) -> SystemId {
        let id = SystemId(self.systems.len());
        system.id = id;
        system.index = self.id;
        self.system_by_slug.insert(system.slug.clone(), id);
        self.systems.push(system);
        id
    }

    fn insert_planet(&mut self, mut planet: Planet) -> PlanetId {
        let id = PlanetId(self.planets.len());
        planet.id = id;
        planet.index = self.id;
        self.systems[planet.host.0].planets.push(id);
        self.planet_by_slug.insert(planet.slug.clone(), id);
        self.planets.push(planet);
        id
    }

    /// Index one parsed table row.
    ///
    /// The host system is created from this row only if no system with the same slug exists
    /// yet; otherwise the planet is appended to the existing system and the row's host
    /// metadata is ignored.
    ///
    /// Arguments
    /// -----------------
    /// * `row`: a coerced row of the waypoint table.
    ///
    /// Return
    /// ----------
    /// * The [`RowOutcome`]; skipped rows leave the index untouched.
    pub fn insert_row(&mut self, row: WaypointRow) -> RowOutcome {
        let Some(fields) = row.required_fields() else {
            trace!(rowid = ?row.rowid, "skipping incomplete waypoint row");
            return RowOutcome::Incomplete;
        };

        if self.planet_by_slug.contains_key(&fields.planet_slug) {
            trace!(slug = %fields.planet_slug, "skipping duplicate planet slug");
            return RowOutcome::DuplicatePlanet;
        }

        let host = match self.system_by_slug.get(&fields.host_slug) {
            Some(&id) => id,
            None => self.insert_system(HostSystem {
                id: SystemId(0),
                index: 0,
                slug: fields.host_slug,
                name: fields.host_name,
                coordinate: fields.coordinate,
                distance: row.sy_dist,
                num_stars: row.sy_snum,
                num_planets: row.sy_pnum,
                v_magnitude: row.sy_vmag,
                gaia_magnitude: row.sy_gmag,
                spectral_type: row.st_spectype.clone(),
                planets: SmallVec::new(),
            }),
        };

        let id = self.insert_planet(Planet {
            id: PlanetId(0),
            index: 0,
            slug: fields.planet_slug,
            name: fields.planet_name,
            coordinate: fields.coordinate,
            host,
            distance: row.sy_dist,
            discovery: DiscoveryInfo {
                year: row.disc_year,
                method: row.discoverymethod,
                facility: row.disc_facility,
                reference_link: row.disc_refname,
            },
            physical: PhysicalMetrics {
                radius_rel_earth: row.pl_rade,
                mass_rel_earth: row.pl_bmasse,
                mass_provenance: row.pl_bmassprov,
            },
            orbit: OrbitalMetrics {
                period_days: row.pl_orbper,
                semi_major_axis_au: row.pl_orbsmax,
                eccentricity: row.pl_orbeccen,
            },
        });

        RowOutcome::Indexed(id)
    }

    pub fn lookup_planet(&self, slug: &str) -> Option<&Planet> {
        self.planet_by_slug.get(slug).and_then(|id| self.planets.get(id.0))
    }

    pub fn lookup_system(&self, slug: &str) -> Option<&HostSystem> {
        self.system_by_slug.get(slug).and_then(|id| self.systems.get(id.0))
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.0)
    }

    pub fn system(&self, id: SystemId) -> Option<&HostSystem> {
        self.systems.get(id.0)
    }

    /// All planets, in insertion order (Earth first).
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// All host systems, in insertion order (Solar System first).
    pub fn systems(&self) -> &[HostSystem] {
        &self.systems
    }

    /// Identity of this index; records built by it carry the same value.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether `planet` was built by this index.
    pub fn owns(&self, planet: &Planet) -> bool {
        planet.index == self.id
    }

    /// Host system of a planet.
    ///
    /// Return
    /// ----------
    /// * `None` when `planet` comes from another index.
    pub fn host_of(&self, planet: &Planet) -> Option<&HostSystem> {
        if !self.owns(planet) {
            return None;
        }
        self.systems.get(planet.host.0)
    }

    /// Planets of a system, in file order. Empty for a system of another index.
    pub fn planets_of<'a>(&'a self, system: &'a HostSystem) -> impl Iterator<Item = &'a Planet> {
        let ids: &[PlanetId] = if system.index == self.id {
            &system.planets
        } else {
            &[]
        };
        ids.iter().filter_map(move |id| self.planets.get(id.0))
    }

    pub fn planet_count(&self) -> usize {
        self.planets.len()
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// One search entry per planet and per host system.
    pub fn search_entries(&self) -> Vec<SearchEntry> {
        let planets = self.planets.iter().map(|p| SearchEntry {
            name: p.name.clone(),
            slug: p.slug.clone(),
            kind: EntryKind::Planet,
        });
        let systems = self.systems.iter().map(|s| SearchEntry {
            name: s.name.clone(),
            slug: s.slug.clone(),
            kind: EntryKind::System,
        });
        planets.chain(systems).collect()
    }
}
