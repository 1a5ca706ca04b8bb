#![allow(dead_code)]

use std::{
    fs,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use astris::{
    stars::star_proto::{Star, StarCollection},
    AstrisError, CatalogLoader,
};
use camino::{Utf8Path, Utf8PathBuf};
use prost::Message;
use tempfile::TempDir;

pub const WAYPOINTS_FIXTURE: &str = "tests/data/waypoints.csv";

/// Encode `(source_id, position, magnitude)` triples as a star catalog blob.
pub fn encode_stars(stars: &[(i64, [f32; 3], f32)]) -> Vec<u8> {
    StarCollection {
        stars: stars
            .iter()
            .map(|&(source_id, [x, y, z], magnitude)| Star {
                source_id,
                x,
                y,
                z,
                phot_g_mean_mag: magnitude,
                absolute_magnitude: magnitude - 5.0,
                hue: 0.5,
            })
            .collect(),
    }
    .encode_to_vec()
}

/// Write a star catalog into `dir` and return its path.
pub fn write_star_catalog(dir: &TempDir, stars: &[(i64, [f32; 3], f32)]) -> Utf8PathBuf {
    let path = Utf8Path::from_path(dir.path())
        .expect("temporary directory path is UTF-8")
        .join("stars.pb");
    fs::write(&path, encode_stars(stars)).expect("write star catalog");
    path
}

/// Waypoint table with `count` host systems of one planet each, system `i` at `(i, 0, 0)`.
pub fn system_table(count: usize) -> String {
    let mut table = String::from("rowid,pl_name,hostname,x,y,z\n");
    for i in 1..=count {
        table.push_str(&format!("{i},Host {i} b,Host {i},{i},0,0\n"));
    }
    table
}

/// In-memory loader counting how many load sequences were started.
pub struct CountingLoader {
    pub stars: Vec<u8>,
    pub waypoints: Vec<u8>,
    pub delay: Duration,
    starts: Arc<AtomicUsize>,
}

impl CountingLoader {
    pub fn new(stars: Vec<u8>, waypoints: impl Into<Vec<u8>>) -> Self {
        CountingLoader {
            stars,
            waypoints: waypoints.into(),
            delay: Duration::from_millis(20),
            starts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of started load sequences, still readable once the loader is moved.
    pub fn start_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.starts)
    }
}

impl CatalogLoader for CountingLoader {
    async fn fetch_stars(&self) -> Result<Vec<u8>, AstrisError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.stars.clone())
    }

    async fn fetch_waypoints(&self) -> Result<Vec<u8>, AstrisError> {
        Ok(self.waypoints.clone())
    }
}
