//! # Waypoint table reader
//!
//! Reads the headered, comma-delimited waypoint table into a [`CatalogIndex`].
//!
//! ## Overview
//! -----------------
//! Rows are deserialized one at a time into the fixed [`WaypointRow`] schema (every cell
//! trimmed and coerced, see [`waypoint_row`](super::waypoint_row)) and inserted in file
//! order. The index is pre-seeded with the synthetic Earth / Solar System records.
//!
//! ## Error Handling
//! -----------------
//! * Rows without identity, names or a complete position are skipped and counted in
//!   [`ParseReport::skipped`]; they never fail the parse.
//! * I/O and CSV framing errors (e.g. invalid UTF-8) abort the whole parse with
//!   [`AstrisError::CsvError`].
//!
//! ## Threading
//! -----------------
//! [`parse_waypoints`] moves the CPU-bound work onto tokio's blocking pool so the calling
//! task is never stalled by a large table.
use std::io::Read;

use tracing::{debug, info};

use crate::astris_errors::AstrisError;

use super::{waypoint_row::WaypointRow, CatalogIndex, RowOutcome};

/// Row counts gathered while reading a waypoint table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Data rows read from the table (header excluded)
    pub rows: usize,
    /// Rows that produced a planet
    pub indexed: usize,
    /// Rows rejected for a missing identity, name or position
    pub skipped: usize,
    /// Rows whose planet slug was already indexed
    pub duplicates: usize,
}

/// Read a waypoint table into a fresh [`CatalogIndex`].
///
/// Arguments
/// -----------------
/// * `reader`: source of the CSV text, header line first.
///
/// Return
/// ----------
/// * The populated index (synthetic Earth included) and the [`ParseReport`], or the first
///   I/O / CSV framing error encountered.
pub fn read_waypoints<R: Read>(reader: R) -> Result<(CatalogIndex, ParseReport), AstrisError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut index = CatalogIndex::new();
    let mut report = ParseReport::default();

    for record in csv_reader.deserialize::<WaypointRow>() {
        let row = record?;
        report.rows += 1;
        match index.insert_row(row) {
            RowOutcome::Indexed(_) => report.indexed += 1,
            RowOutcome::Incomplete => report.skipped += 1,
            RowOutcome::DuplicatePlanet => report.duplicates += 1,
        }
    }

    debug!(?report, "waypoint table read");
    Ok((index, report))
}

/// Parse a fetched waypoint table on the blocking pool.
///
/// Arguments
/// -----------------
/// * `bytes`: the whole table, as fetched.
///
/// Return
/// ----------
/// * The populated index and its [`ParseReport`].
///
/// See also
/// ------------
/// * [`read_waypoints`] – Synchronous reader doing the actual work.
pub async fn parse_waypoints(bytes: Vec<u8>) -> Result<(CatalogIndex, ParseReport), AstrisError> {
    let (index, report) =
        tokio::task::spawn_blocking(move || read_waypoints(bytes.as_slice())).await??;

    info!(
        planets = index.planet_count(),
        systems = index.system_count(),
        skipped = report.skipped,
        duplicates = report.duplicates,
        "waypoint table parsed"
    );
    Ok((index, report))
}
