//! Wire schema of the binary star catalog.
//!
//! ```text
//! message Star {
//!   int64 source_id = 1;
//!   float x = 2;
//!   float y = 3;
//!   float z = 4;
//!   float phot_g_mean_mag = 5;
//!   float absolute_magnitude = 6;
//!   float hue = 7;
//! }
//!
//! message StarCollection {
//!   repeated Star stars = 1;
//! }
//! ```
//!
//! A zero `source_id` is the proto3 default and marks a sentinel record.

/// One Gaia source, positions in parsecs.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Star {
    #[prost(int64, tag = "1")]
    pub source_id: i64,
    #[prost(float, tag = "2")]
    pub x: f32,
    #[prost(float, tag = "3")]
    pub y: f32,
    #[prost(float, tag = "4")]
    pub z: f32,
    /// Gaia G-band mean apparent magnitude
    #[prost(float, tag = "5")]
    pub phot_g_mean_mag: f32,
    #[prost(float, tag = "6")]
    pub absolute_magnitude: f32,
    #[prost(float, tag = "7")]
    pub hue: f32,
}

/// The whole catalog, as a sequence of length-delimited [`Star`] records.
#[derive(Clone, PartialEq, prost::Message)]
pub struct StarCollection {
    #[prost(message, repeated, tag = "1")]
    pub stars: Vec<Star>,
}
