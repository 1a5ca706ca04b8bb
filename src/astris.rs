//! # Astris: prefetch orchestration
//!
//! This module defines [`Astris`], the entry point of the crate. It drives the one-time load
//! of the two static input files and hands out the resulting [`Catalog`].
//!
//! ## Overview
//!
//! Loading is a strict sequence, run at most once per instance:
//!
//! ```text
//! fetch star catalog ─▶ decode StarField ─▶ fetch waypoint table ─▶ parse CatalogIndex
//!                                                                         │
//!                                          Catalog (+ search index) ◀─────┘
//! ```
//!
//! The orchestrator walks through [`PrefetchState`]s:
//!
//! | state     | [`Astris::prefetch`] does                                          |
//! |-----------|--------------------------------------------------------------------|
//! | `Ready`   | moves to `Loading`, runs the sequence, then `Loaded` or `Failed`   |
//! | `Loading` | nothing, returns [`PrefetchOutcome::InProgress`]                   |
//! | `Loaded`  | nothing, returns [`PrefetchOutcome::AlreadyLoaded`]                |
//! | `Failed`  | returns [`AstrisError::PrefetchPreviouslyFailed`]                  |
//!
//! The `Ready → Loading` transition is a single compare-and-swap, so concurrent callers can
//! never start two load sequences. A failure is terminal: there is no retry. The sequence
//! runs in its own task, so dropping a `prefetch` future does not abandon the load.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use astris::{astris::Astris, config::AstrisConfig, reference::ReferencePoint};
//!
//! # async fn run() -> Result<(), astris::astris_errors::AstrisError> {
//! let config = AstrisConfig::from_sources("public/waypoints.csv", "public/stars.pb")?;
//! let astris = Astris::new(config)?;
//! astris.prefetch().await?;
//!
//! let catalog = astris.require_catalog()?;
//! let earth = catalog.lookup_planet("earth").expect("Earth is always present");
//! let sky = catalog.localize_stars_relative_to(earth);
//! let matches = catalog.search("proxima").await?;
//! # Ok(()) }
//! ```
//!
//! ## See also
//! ------------
//! * [`CatalogLoader`] – Seam used to supply the raw files (tests use in-memory loaders).
//! * [`AstrisEnv`] – Fetching of local and remote data sources.
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};

use once_cell::sync::OnceCell;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    astris_errors::AstrisError,
    catalog::Catalog,
    config::AstrisConfig,
    env_state::{AstrisEnv, DataSource},
    stars::star_reader::load_stars,
    waypoints::waypoint_reader::parse_waypoints,
};

/// Supplier of the raw catalog files.
pub trait CatalogLoader: Send + Sync + 'static {
    /// Whole encoded star catalog.
    fn fetch_stars(&self) -> impl Future<Output = Result<Vec<u8>, AstrisError>> + Send;

    /// Whole waypoint table, header line first.
    fn fetch_waypoints(&self) -> impl Future<Output = Result<Vec<u8>, AstrisError>> + Send;
}

/// Loader reading the two [`DataSource`]s of an [`AstrisConfig`].
#[derive(Debug, Clone)]
pub struct SourceLoader {
    env: AstrisEnv,
    waypoints: DataSource,
    stars: DataSource,
}

impl SourceLoader {
    pub fn new(config: &AstrisConfig) -> Result<Self, AstrisError> {
        Ok(SourceLoader {
            env: AstrisEnv::new(config.http_timeout())?,
            waypoints: config.waypoints.clone(),
            stars: config.stars.clone(),
        })
    }
}

impl CatalogLoader for SourceLoader {
    async fn fetch_stars(&self) -> Result<Vec<u8>, AstrisError> {
        self.env.fetch_bytes(&self.stars).await
    }

    async fn fetch_waypoints(&self) -> Result<Vec<u8>, AstrisError> {
        self.env.fetch_bytes(&self.waypoints).await
    }
}

/// Lifecycle of the catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PrefetchState {
    Ready = 0,
    Loading = 1,
    Loaded = 2,
    Failed = 3,
}

impl PrefetchState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => PrefetchState::Ready,
            1 => PrefetchState::Loading,
            2 => PrefetchState::Loaded,
            _ => PrefetchState::Failed,
        }
    }
}

/// Result of a successful [`Astris::prefetch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// This call ran the load sequence to completion
    Completed,
    /// A previous call already loaded the catalog
    AlreadyLoaded,
    /// Another call is loading the catalog; see [`Astris::wait_loaded`]
    InProgress,
}

impl PrefetchOutcome {
    /// Whether the catalog became loaded during this very call.
    pub fn newly_completed(&self) -> bool {
        matches!(self, PrefetchOutcome::Completed)
    }
}

/// State shared between an [`Astris`] handle and its load task.
struct Shared<L> {
    config: AstrisConfig,
    loader: L,
    state: AtomicU8,
    state_tx: watch::Sender<PrefetchState>,
    catalog: OnceCell<Arc<Catalog>>,
}

/// Moves a load that ends without reaching a final state (panic, runtime shutdown) to
/// `Failed`, so waiters are always released.
struct FailUnlessFinished<'a, L>(&'a Shared<L>);

impl<L> Drop for FailUnlessFinished<'_, L> {
    fn drop(&mut self) {
        if self.0.state() == PrefetchState::Loading {
            warn!("load sequence ended without a result");
            self.0.transition(PrefetchState::Failed);
        }
    }
}

impl<L> Shared<L> {
    fn state(&self) -> PrefetchState {
        PrefetchState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, next: PrefetchState) {
        self.state.store(next as u8, Ordering::Release);
        self.state_tx.send_replace(next);
    }
}

impl<L: CatalogLoader> Shared<L> {
    /// Run the load sequence and record its final state.
    async fn run(&self) -> Result<(), AstrisError> {
        let _finish = FailUnlessFinished(self);

        match self.load().await {
            Ok(catalog) => {
                if self.catalog.set(Arc::new(catalog)).is_err() {
                    warn!("catalog was already set");
                }
                self.transition(PrefetchState::Loaded);
                info!("prefetch completed");
                Ok(())
            }
            Err(e) => {
                self.transition(PrefetchState::Failed);
                error!("prefetch failed: {e}");
                Err(e)
            }
        }
    }

    async fn load(&self) -> Result<Catalog, AstrisError> {
        let bytes = self.loader.fetch_stars().await?;
        let (stars, _) = load_stars(bytes, self.config.star_buffer_capacity).await?;

        let bytes = self.loader.fetch_waypoints().await?;
        let (index, _) = parse_waypoints(bytes).await?;

        Catalog::build(index, stars, &self.config).await
    }
}

/// Entry point of the crate: owns the load state and, once loaded, the [`Catalog`].
pub struct Astris<L: CatalogLoader = SourceLoader> {
    shared: Arc<Shared<L>>,
}

impl Astris<SourceLoader> {
    /// Construct an orchestrator reading the sources named in `config`.
    ///
    /// Nothing is fetched yet; call [`Astris::prefetch`].
    ///
    /// Arguments
    /// -----------------
    /// * `config`: data sources, timeouts and tunable sizes.
    ///
    /// Return
    /// ----------
    /// * A new orchestrator in the `Ready` state, or an error if the HTTP client cannot be
    ///   built.
    pub fn new(config: AstrisConfig) -> Result<Self, AstrisError> {
        let loader = SourceLoader::new(&config)?;
        Ok(Self::with_loader(config, loader))
    }
}

impl<L: CatalogLoader> Astris<L> {
    /// Construct an orchestrator around a custom [`CatalogLoader`].
    pub fn with_loader(config: AstrisConfig, loader: L) -> Self {
        let (state_tx, _) = watch::channel(PrefetchState::Ready);
        Astris {
            shared: Arc::new(Shared {
                config,
                loader,
                state: AtomicU8::new(PrefetchState::Ready as u8),
                state_tx,
                catalog: OnceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &AstrisConfig {
        &self.shared.config
    }

    pub fn loader(&self) -> &L {
        &self.shared.loader
    }

    pub fn state(&self) -> PrefetchState {
        self.shared.state()
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == PrefetchState::Loaded
    }

    /// The loaded catalog, if any.
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.shared.catalog.get().cloned()
    }

    /// The loaded catalog, or [`AstrisError::CatalogNotLoaded`].
    pub fn require_catalog(&self) -> Result<Arc<Catalog>, AstrisError> {
        self.catalog().ok_or(AstrisError::CatalogNotLoaded)
    }

    /// Load the catalog if no other call has.
    ///
    /// The load sequence runs in its own tokio task: once started it reaches `Loaded` or
    /// `Failed` even if this future is dropped. Must be called within a tokio runtime.
    ///
    /// Return
    /// ----------
    /// * [`PrefetchOutcome::Completed`] when this call performed the load.
    /// * [`PrefetchOutcome::InProgress`] or [`PrefetchOutcome::AlreadyLoaded`] when another
    ///   call started it; these never fail.
    /// * The fetch, decode or parse error of this call's load, which leaves the instance in
    ///   the `Failed` state; [`AstrisError::PrefetchPreviouslyFailed`] on any later call.
    ///
    /// See also
    /// ------------
    /// * [`Astris::wait_loaded`] – Await a load started by another call.
    pub async fn prefetch(&self) -> Result<PrefetchOutcome, AstrisError> {
        if let Err(current) = self.shared.state.compare_exchange(
            PrefetchState::Ready as u8,
            PrefetchState::Loading as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return match PrefetchState::from_u8(current) {
                PrefetchState::Loaded => Ok(PrefetchOutcome::AlreadyLoaded),
                PrefetchState::Failed => Err(AstrisError::PrefetchPreviouslyFailed),
                _ => Ok(PrefetchOutcome::InProgress),
            };
        }
        self.shared.state_tx.send_replace(PrefetchState::Loading);
        info!("prefetch started");

        let shared = Arc::clone(&self.shared);
        let load = tokio::spawn(async move { shared.run().await });

        load.await??;
        Ok(PrefetchOutcome::Completed)
    }

    /// Wait for the running prefetch to finish.
    ///
    /// Return
    /// ----------
    /// * `true` once the catalog is loaded.
    /// * `false` if the load failed, or immediately if no prefetch was ever started.
    pub async fn wait_loaded(&self) -> bool {
        if self.state() == PrefetchState::Ready {
            return false;
        }
        let mut rx = self.shared.state_tx.subscribe();
        let loaded = match rx
            .wait_for(|s| matches!(s, PrefetchState::Loaded | PrefetchState::Failed))
            .await
        {
            Ok(state) => *state == PrefetchState::Loaded,
            Err(_) => self.is_loaded(),
        };
        loaded
    }
}

#[cfg(test)]
mod astris_tests {
    use super::*;
    use crate::stars::star_proto::{Star, StarCollection};
    use prost::Message;
    use std::sync::atomic::AtomicUsize;

    struct MemoryLoader {
        stars: Vec<u8>,
        waypoints: Vec<u8>,
        fetches: AtomicUsize,
    }

    impl MemoryLoader {
        fn new(waypoints: &str) -> Self {
            let stars = StarCollection {
                stars: vec![Star {
                    source_id: 7,
                    x: 1.0,
                    y: 2.0,
                    z: 3.0,
                    phot_g_mean_mag: 5.0,
                    ..Default::default()
                }],
            };
            MemoryLoader {
                stars: stars.encode_to_vec(),
                waypoints: waypoints.as_bytes().to_vec(),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl CatalogLoader for MemoryLoader {
        async fn fetch_stars(&self) -> Result<Vec<u8>, AstrisError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(self.stars.clone())
        }

        async fn fetch_waypoints(&self) -> Result<Vec<u8>, AstrisError> {
            Ok(self.waypoints.clone())
        }
    }

    struct PanickingLoader;

    impl CatalogLoader for PanickingLoader {
        async fn fetch_stars(&self) -> Result<Vec<u8>, AstrisError> {
            panic!("star source unavailable");
        }

        async fn fetch_waypoints(&self) -> Result<Vec<u8>, AstrisError> {
            Ok(Vec::new())
        }
    }

    const TABLE: &str = "rowid,pl_name,hostname,x,y,z\n1,GJ 1214 b,GJ 1214,3,4,5\n";

    #[tokio::test]
    async fn test_prefetch_once() {
        let astris = Astris::with_loader(AstrisConfig::default(), MemoryLoader::new(TABLE));
        assert_eq!(astris.state(), PrefetchState::Ready);
        assert!(astris.catalog().is_none());
        assert_eq!(
            astris.require_catalog().unwrap_err(),
            AstrisError::CatalogNotLoaded
        );

        assert_eq!(astris.prefetch().await.unwrap(), PrefetchOutcome::Completed);
        assert_eq!(
            astris.prefetch().await.unwrap(),
            PrefetchOutcome::AlreadyLoaded
        );
        assert!(astris.is_loaded());
        assert!(astris.wait_loaded().await);
        assert_eq!(astris.loader().fetches.load(Ordering::SeqCst), 1);

        let catalog = astris.require_catalog().unwrap();
        assert_eq!(catalog.stats().stars, 1);
        assert!(catalog.lookup_planet("gj-1214-b").is_some());
    }

    #[tokio::test]
    async fn test_wait_without_prefetch() {
        let astris = Astris::with_loader(AstrisConfig::default(), MemoryLoader::new(TABLE));
        assert!(!astris.wait_loaded().await);
    }

    #[tokio::test]
    async fn test_failed_prefetch_is_terminal() {
        let mut loader = MemoryLoader::new(TABLE);
        loader.stars = vec![0xff, 0xff, 0xff];
        let astris = Astris::with_loader(AstrisConfig::default(), loader);

        let err = astris.prefetch().await.unwrap_err();
        assert!(matches!(err, AstrisError::StarDecodeError(_)));
        assert_eq!(astris.state(), PrefetchState::Failed);
        assert!(!astris.wait_loaded().await);

        assert_eq!(
            astris.prefetch().await.unwrap_err(),
            AstrisError::PrefetchPreviouslyFailed
        );
        assert_eq!(astris.loader().fetches.load(Ordering::SeqCst), 1);
        assert!(astris.catalog().is_none());
    }

    #[tokio::test]
    async fn test_panicking_load_fails() {
        let astris = Astris::with_loader(AstrisConfig::default(), PanickingLoader);

        let err = astris.prefetch().await.unwrap_err();
        assert!(matches!(err, AstrisError::TaskJoinError(_)));
        assert_eq!(astris.state(), PrefetchState::Failed);
        assert!(!astris.wait_loaded().await);
        assert_eq!(
            astris.prefetch().await.unwrap_err(),
            AstrisError::PrefetchPreviouslyFailed
        );
    }
}
