//! Decoding of the binary star catalog.
//!
//! The catalog is fetched as one blob and decoded as a [`StarCollection`]. Each record with a
//! nonzero source identifier contributes its position and G magnitude to the [`StarField`]
//! buffers; the others are sentinel entries of the source catalog and are dropped.
use prost::Message;
use tracing::{debug, info};

use crate::astris_errors::AstrisError;

use super::{star_proto::StarCollection, StarField};

/// Number of records decoded from a catalog blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarReport {
    pub records: usize,
    pub kept: usize,
    /// Records without a source identifier
    pub dropped: usize,
}

/// Decode a catalog blob into flat buffers.
///
/// Arguments
/// -----------------
/// * `bytes`: the encoded [`StarCollection`].
/// * `initial_capacity`: starting capacity of the buffers, in stars.
///
/// Return
/// ----------
/// * The [`StarField`] and a [`StarReport`], or [`AstrisError::StarDecodeError`] when the blob
///   is not a valid collection.
pub fn decode_stars(
    bytes: &[u8],
    initial_capacity: usize,
) -> Result<(StarField, StarReport), AstrisError> {
    let collection = StarCollection::decode(bytes)?;

    let mut field = StarField::with_capacity(initial_capacity);
    let mut report = StarReport {
        records: collection.stars.len(),
        ..Default::default()
    };

    for star in &collection.stars {
        if star.source_id == 0 {
            report.dropped += 1;
            continue;
        }
        field.push([star.x, star.y, star.z], star.phot_g_mean_mag);
        report.kept += 1;
    }

    debug!(?report, capacity = field.magnitude_buffer().capacity(), "star catalog decoded");
    Ok((field, report))
}

/// Decode a fetched catalog on the blocking pool.
///
/// See also
/// ------------
/// * [`decode_stars`] – Synchronous decoder doing the actual work.
pub async fn load_stars(
    bytes: Vec<u8>,
    initial_capacity: usize,
) -> Result<(StarField, StarReport), AstrisError> {
    let (field, report) =
        tokio::task::spawn_blocking(move || decode_stars(&bytes, initial_capacity)).await??;
    info!(stars = field.len(), dropped = report.dropped, "star catalog loaded");
    Ok((field, report))
}
