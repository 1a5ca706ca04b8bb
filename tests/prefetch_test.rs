mod common;

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

use astris::{
    constants::Coordinate, reference::ReferencePoint, Astris, AstrisConfig, AstrisError,
    PrefetchOutcome, PrefetchState,
};
use common::{encode_stars, write_star_catalog, CountingLoader, WAYPOINTS_FIXTURE};
use tempfile::TempDir;

fn stars() -> Vec<(i64, [f32; 3], f32)> {
    vec![
        (101, [1.0, 2.0, 3.0], 4.5),
        (0, [9.0, 9.0, 9.0], 1.0),
        (102, [-2.0, 0.0, 5.0], 9.25),
    ]
}

#[tokio::test]
async fn test_concurrent_prefetch_loads_once() {
    let table = std::fs::read(WAYPOINTS_FIXTURE).unwrap();
    let loader = CountingLoader::new(encode_stars(&stars()), table);
    let starts = loader.start_counter();
    let astris = Arc::new(Astris::with_loader(AstrisConfig::default(), loader));

    let first = tokio::spawn({
        let astris = Arc::clone(&astris);
        async move { astris.prefetch().await }
    });
    let second = tokio::spawn({
        let astris = Arc::clone(&astris);
        async move { astris.prefetch().await }
    });

    let mut outcomes = vec![
        first.await.unwrap().unwrap(),
        second.await.unwrap().unwrap(),
    ];
    outcomes.sort_by_key(|o| !o.newly_completed());
    assert_eq!(outcomes[0], PrefetchOutcome::Completed);
    assert_ne!(outcomes[1], PrefetchOutcome::Completed);

    assert!(astris.wait_loaded().await);
    assert_eq!(astris.state(), PrefetchState::Loaded);
    assert_eq!(
        astris.prefetch().await.unwrap(),
        PrefetchOutcome::AlreadyLoaded
    );
    assert_eq!(starts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dropped_prefetch_still_completes() {
    let table = std::fs::read(WAYPOINTS_FIXTURE).unwrap();
    let mut loader = CountingLoader::new(encode_stars(&stars()), table);
    loader.delay = Duration::from_millis(200);
    let starts = loader.start_counter();
    let astris = Astris::with_loader(AstrisConfig::default(), loader);

    let abandoned = tokio::time::timeout(Duration::from_millis(10), astris.prefetch()).await;
    assert!(abandoned.is_err());
    assert_eq!(astris.state(), PrefetchState::Loading);

    let loaded = tokio::time::timeout(Duration::from_secs(2), astris.wait_loaded()).await;
    assert_eq!(loaded, Ok(true));
    assert_eq!(astris.state(), PrefetchState::Loaded);
    assert!(astris.catalog().is_some());
    assert_eq!(
        astris.prefetch().await.unwrap(),
        PrefetchOutcome::AlreadyLoaded
    );
    assert_eq!(starts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_waiter_observes_completion() {
    let table = std::fs::read(WAYPOINTS_FIXTURE).unwrap();
    let loader = CountingLoader::new(encode_stars(&stars()), table);
    let astris = Arc::new(Astris::with_loader(AstrisConfig::default(), loader));

    let (loaded, waited) = tokio::join!(astris.prefetch(), async {
        tokio::task::yield_now().await;
        let outcome = astris.prefetch().await.unwrap();
        (outcome, astris.wait_loaded().await)
    });

    assert_eq!(loaded.unwrap(), PrefetchOutcome::Completed);
    assert_eq!(waited, (PrefetchOutcome::InProgress, true));
    assert!(astris.catalog().is_some());
}

#[tokio::test]
async fn test_prefetch_from_files() {
    let dir = TempDir::new().unwrap();
    let stars_path = write_star_catalog(&dir, &stars());

    let config = AstrisConfig::from_sources(WAYPOINTS_FIXTURE, stars_path.as_str()).unwrap();
    let astris = Astris::new(config).unwrap();
    assert_eq!(astris.prefetch().await.unwrap(), PrefetchOutcome::Completed);

    let catalog = astris.require_catalog().unwrap();
    let stats = catalog.stats();
    assert_eq!(stats.stars, 2);
    assert_eq!(stats.planets, 5);
    assert_eq!(stats.systems, 3);

    let earth = catalog.lookup_planet("earth").unwrap();
    assert!(earth.is_earth());
    let sky = catalog.localize_stars_relative_to(earth);
    assert_eq!(sky.count, 2);
    assert_eq!(&sky.displacements[0..3], &[1.0, 2.0, 3.0]);

    let point = ReferencePoint::new(Coordinate::new(1.0, 2.0, 3.0));
    let shifted = catalog.localize_stars_relative_to(&point);
    assert_eq!(&shifted.displacements[3..6], &[-3.0, -2.0, 2.0]);

    let proxima = catalog.lookup_planet("proxima-cen-b").unwrap();
    let waypoints = catalog.localize_systems_relative_to(proxima);
    assert_eq!(waypoints.count, 2);

    let system = catalog.host_of(proxima).unwrap();
    let planets = catalog.planets_by_name(system);
    let names: Vec<_> = planets.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Proxima Cen b", "Proxima Cen d"]);
}

#[tokio::test]
async fn test_search_after_prefetch() {
    let dir = TempDir::new().unwrap();
    let stars_path = write_star_catalog(&dir, &stars());
    let config = AstrisConfig::from_sources(WAYPOINTS_FIXTURE, stars_path.as_str()).unwrap();
    let astris = Astris::new(config).unwrap();
    astris.prefetch().await.unwrap();
    let catalog = astris.require_catalog().unwrap();

    assert!(catalog.search("").await.unwrap().is_empty());

    let results = catalog.search("TRAPPIST-1 e").await.unwrap();
    assert!(results.len() <= 3);
    assert_eq!(results[0].slug, "trappist-1-e");
    assert_eq!(results[0].route(), "/planets/trappist-1-e");

    let results = catalog.search("proxma").await.unwrap();
    assert!(results.iter().any(|e| e.slug.starts_with("proxima-cen")));
}

#[tokio::test]
async fn test_missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.pb");
    let config =
        AstrisConfig::from_sources(WAYPOINTS_FIXTURE, missing.to_str().unwrap()).unwrap();
    let astris = Astris::new(config).unwrap();

    let err = astris.prefetch().await.unwrap_err();
    assert!(matches!(err, AstrisError::IoError(_)));
    assert_eq!(astris.state(), PrefetchState::Failed);
    assert_eq!(
        astris.prefetch().await.unwrap_err(),
        AstrisError::PrefetchPreviouslyFailed
    );
}
