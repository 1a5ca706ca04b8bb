//! # Catalog: the loaded, queryable data set
//!
//! [`Catalog`] owns everything produced by a successful prefetch:
//!
//! ```text
//! Catalog
//! ├── index      (CatalogIndex: planets, host systems, slug indexes)
//! ├── stars      (StarField: flat position / magnitude buffers)
//! ├── localizer  (Localizer: two bounded relocalization caches)
//! └── search     (SearchWorker: handle to the fuzzy index task)
//! ```
//!
//! It is built once by the [`Astris`](crate::astris::Astris) orchestrator and shared behind an
//! `Arc`. Its tables never change afterwards; only the relocalization caches mutate, under
//! their own lock.
//!
//! ## See also
//! ------------
//! * [`relocalize_systems`](crate::localization::relocalize_systems) – Uncached system pass.
//! * [`relocalize_stars`](crate::localization::relocalize_stars) – Uncached star pass.
//! * [`FuzzyIndex`](crate::search::fuzzy_index::FuzzyIndex) – Ranking used by [`Catalog::search`].
use std::sync::Arc;

use itertools::Itertools;
use tracing::info;

use crate::{
    astris_errors::AstrisError,
    config::AstrisConfig,
    localization::{LocalizedStars, LocalizedSystems, Localizer},
    reference::Reference,
    search::{search_worker::SearchWorker, SearchEntry},
    stars::StarField,
    waypoints::{CatalogIndex, HostSystem, Planet},
};

/// Sizes of a loaded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Planets, the synthetic Earth included
    pub planets: usize,
    /// Host systems, the synthetic Solar System included
    pub systems: usize,
    pub stars: usize,
    pub search_entries: usize,
}

#[derive(Debug)]
pub struct Catalog {
    index: CatalogIndex,
    stars: StarField,
    localizer: Localizer,
    search: SearchWorker,
    search_entries: usize,
}

impl Catalog {
    /// Assemble a catalog and build its search index.
    ///
    /// Must be called within a tokio runtime: the search task is spawned here and the index
    /// is built from every planet and host system before this returns.
    ///
    /// Arguments
    /// -----------------
    /// * `index`: the parsed waypoint tables.
    /// * `stars`: the decoded star buffers.
    /// * `config`: cache capacities and search limit.
    ///
    /// Return
    /// ----------
    /// * The ready catalog, or [`AstrisError::SearchWorkerGone`] if the index build failed.
    pub async fn build(
        index: CatalogIndex,
        stars: StarField,
        config: &AstrisConfig,
    ) -> Result<Self, AstrisError> {
        let entries = index.search_entries();
        let search = SearchWorker::spawn_with(entries, config.search_limit).await?;
        let search_entries = index.planet_count() + index.system_count();

        let catalog = Catalog {
            index,
            stars,
            localizer: Localizer::new(config.system_cache_capacity, config.star_cache_capacity),
            search,
            search_entries,
        };

        let stats = catalog.stats();
        info!(
            planets = stats.planets,
            systems = stats.systems,
            stars = stats.stars,
            "catalog ready"
        );
        Ok(catalog)
    }

    pub fn lookup_planet(&self, slug: &str) -> Option<&Planet> {
        self.index.lookup_planet(slug)
    }

    pub fn lookup_system(&self, slug: &str) -> Option<&HostSystem> {
        self.index.lookup_system(slug)
    }

    /// Host system of `planet`; `None` for a planet of another catalog.
    pub fn host_of(&self, planet: &Planet) -> Option<&HostSystem> {
        self.index.host_of(planet)
    }

    pub fn planets_of<'a>(&'a self, system: &'a HostSystem) -> impl Iterator<Item = &'a Planet> {
        self.index.planets_of(system)
    }

    /// Planets of `system` sorted by display name, as listed on a system page.
    pub fn planets_by_name<'a>(&'a self, system: &'a HostSystem) -> Vec<&'a Planet> {
        self.index
            .planets_of(system)
            .sorted_by(|a, b| a.name().cmp(b.name()))
            .collect()
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    /// Every host system but `planet`'s own, as displacements from `planet`.
    ///
    /// Memoized per planet; a repeated call for a recently used planet returns the same
    /// shared result.
    pub fn localize_systems_relative_to(&self, planet: &Planet) -> Arc<LocalizedSystems> {
        self.localizer.systems_relative_to(&self.index, planet)
    }

    /// Every star as a displacement from `reference`, with its grayscale color.
    ///
    /// Memoized per reference identity.
    pub fn localize_stars_relative_to<R: Reference + ?Sized>(
        &self,
        reference: &R,
    ) -> Arc<LocalizedStars> {
        self.localizer.stars_relative_to(&self.stars, reference)
    }

    /// Up to `search_limit` planets and systems whose name approximately matches `text`.
    pub async fn search(&self, text: &str) -> Result<Vec<SearchEntry>, AstrisError> {
        self.search.query(text).await
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            planets: self.index.planet_count(),
            systems: self.index.system_count(),
            stars: self.stars.len(),
            search_entries: self.search_entries,
        }
    }
}

#[cfg(test)]
mod catalog_tests {
    use super::*;
    use crate::waypoints::waypoint_reader::read_waypoints;

    const TABLE: &str = "\
rowid,pl_name,hostname,x,y,z
1,Kepler-90 h,Kepler-90,10,0,0
2,Kepler-90 b,Kepler-90,10,0,0
3,Kepler-90 c,Kepler-90,10,0,0
4,Gliese 581 c,Gliese 581,0,6,0
";

    async fn catalog() -> Catalog {
        let (index, _) = read_waypoints(TABLE.as_bytes()).unwrap();
        let stars = StarField::from_points([([1.0, 0.0, 0.0], 3.0), ([0.0, 1.0, 0.0], 7.0)]);
        Catalog::build(index, stars, &AstrisConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stats() {
        let catalog = catalog().await;
        assert_eq!(
            catalog.stats(),
            CatalogStats {
                planets: 5,
                systems: 3,
                stars: 2,
                search_entries: 8
            }
        );
    }

    #[tokio::test]
    async fn test_planets_by_name() {
        let catalog = catalog().await;
        let system = catalog.lookup_system("kepler-90").unwrap();

        let in_file_order: Vec<_> = catalog.planets_of(system).map(|p| p.name()).collect();
        assert_eq!(in_file_order, vec!["Kepler-90 h", "Kepler-90 b", "Kepler-90 c"]);

        let sorted: Vec<_> = catalog
            .planets_by_name(system)
            .into_iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(sorted, vec!["Kepler-90 b", "Kepler-90 c", "Kepler-90 h"]);
    }

    #[tokio::test]
    async fn test_localize_systems_from_planet() {
        let catalog = catalog().await;
        let planet = catalog.lookup_planet("gliese-581-c").unwrap();

        let result = catalog.localize_systems_relative_to(planet);
        assert_eq!(result.count, 2);
        let slugs: Vec<_> = result
            .systems
            .iter()
            .map(|id| catalog.index().system(*id).unwrap().slug())
            .collect();
        assert_eq!(slugs, vec!["solar-system", "kepler-90"]);
        assert_eq!(result.displacements, vec![0.0, -6.0, 0.0, 10.0, -6.0, 0.0]);

        let again = catalog.localize_systems_relative_to(planet);
        assert!(Arc::ptr_eq(&result, &again));
        assert_eq!(catalog.localizer().system_passes(), 1);
    }

    #[tokio::test]
    async fn test_search_known_planet() {
        let catalog = catalog().await;
        let results = catalog.search("gliese 581").await.unwrap();
        assert!(results.len() <= 3);
        assert!(results.iter().any(|e| e.slug == "gliese-581-c"));
        assert!(catalog.search(" ").await.unwrap().is_empty());
    }
}
