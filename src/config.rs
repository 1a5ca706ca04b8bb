//! Runtime configuration of the catalog loader.
//!
//! [`AstrisConfig`] gathers the two input locations and the tunable sizes used by the
//! loaders, the relocalization caches and the search index. Every field has a default, so a
//! partial TOML/JSON document (or none at all) is enough.
use std::time::Duration;

use serde::Deserialize;

use crate::{
    astris_errors::AstrisError,
    constants::{
        DEFAULT_BUFFER_CAPACITY, DEFAULT_CACHE_CAPACITY, DEFAULT_HTTP_TIMEOUT_SECS,
        DEFAULT_SEARCH_LIMIT, DEFAULT_STARS_SOURCE, DEFAULT_WAYPOINTS_SOURCE,
    },
    env_state::DataSource,
};

/// Configuration of an [`Astris`](crate::astris::Astris) instance.
///
/// Fields
/// -----------------
/// * `waypoints` – Location of the headered CSV waypoint table.
/// * `stars` – Location of the binary star catalog.
/// * `http_timeout_secs` – Timeout of each remote fetch.
/// * `system_cache_capacity` – Distinct planets remembered by the system relocalization cache.
/// * `star_cache_capacity` – Distinct references remembered by the star relocalization cache.
/// * `search_limit` – Maximum number of ranked search matches.
/// * `star_buffer_capacity` – Initial capacity of the growable star buffers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AstrisConfig {
    pub waypoints: DataSource,
    pub stars: DataSource,
    pub http_timeout_secs: u64,
    pub system_cache_capacity: usize,
    pub star_cache_capacity: usize,
    pub search_limit: usize,
    pub star_buffer_capacity: usize,
}

impl Default for AstrisConfig {
    fn default() -> Self {
        AstrisConfig {
            waypoints: DataSource::Local(DEFAULT_WAYPOINTS_SOURCE.into()),
            stars: DataSource::Local(DEFAULT_STARS_SOURCE.into()),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            system_cache_capacity: DEFAULT_CACHE_CAPACITY,
            star_cache_capacity: DEFAULT_CACHE_CAPACITY,
            search_limit: DEFAULT_SEARCH_LIMIT,
            star_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl AstrisConfig {
    /// Build a configuration from two source descriptors, keeping every other default.
    ///
    /// Arguments
    /// -----------------
    /// * `waypoints`: descriptor of the waypoint table (URL, `file://` URL or path).
    /// * `stars`: descriptor of the binary star catalog.
    ///
    /// Return
    /// ----------
    /// * The configuration, or [`AstrisError::InvalidDataSource`] for a bad descriptor.
    pub fn from_sources(waypoints: &str, stars: &str) -> Result<Self, AstrisError> {
        Ok(AstrisConfig {
            waypoints: waypoints.try_into()?,
            stars: stars.try_into()?,
            ..Default::default()
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
