//! # Stars: the binary catalog as flat buffers
//!
//! Stars are never materialized as individual objects. The catalog is kept as two parallel
//! flat buffers, consumed directly by the relocalization pass and by rendering:
//!
//! ```text
//! positions  : [x0, y0, z0, x1, y1, z1, ...]   3 × f32 per star, parsecs
//! magnitudes : [m0, m1, ...]                   1 × f32 per star, Gaia G
//! ```
//!
//! Modules
//! -----------------
//! * [`growable_buffer`] – Doubling append-only buffer used while decoding.
//! * [`star_proto`] – Protobuf schema of the catalog file.
//! * [`star_reader`] – Decoding of a fetched catalog into a [`StarField`].
pub mod growable_buffer;
pub mod star_proto;
pub mod star_reader;

use crate::constants::DEFAULT_BUFFER_CAPACITY;

use growable_buffer::GrowableBuffer;

/// Positions and magnitudes of every valid star of the catalog.
///
/// Invariant: `positions().len() == 3 * magnitudes().len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    positions: GrowableBuffer<f32>,
    magnitudes: GrowableBuffer<f32>,
}

impl Default for StarField {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl StarField {
    /// Create an empty field whose buffers start with room for `capacity` stars.
    pub fn with_capacity(capacity: usize) -> Self {
        StarField {
            positions: GrowableBuffer::with_capacity(capacity * 3),
            magnitudes: GrowableBuffer::with_capacity(capacity),
        }
    }

    /// Build a field from `(position, magnitude)` pairs.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = ([f32; 3], f32)>,
    {
        let points = points.into_iter();
        let mut field = Self::with_capacity(points.size_hint().0.max(1));
        for (position, magnitude) in points {
            field.push(position, magnitude);
        }
        field
    }

    /// Append one star.
    #[inline]
    pub fn push(&mut self, position: [f32; 3], magnitude: f32) {
        self.positions.append(&position);
        self.magnitudes.push(magnitude);
    }

    /// Number of stars.
    #[inline]
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Flat `[x, y, z]` positions, 3 values per star.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        self.positions.as_slice()
    }

    /// One magnitude per star.
    #[inline]
    pub fn magnitudes(&self) -> &[f32] {
        self.magnitudes.as_slice()
    }

    pub fn position_buffer(&self) -> &GrowableBuffer<f32> {
        &self.positions
    }

    pub fn magnitude_buffer(&self) -> &GrowableBuffer<f32> {
        &self.magnitudes
    }
}
