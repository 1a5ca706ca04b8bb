//! Fixed-field schema of the waypoint table.
//!
//! Every column is optional at the schema level and goes through one of the coercion
//! helpers below, so a malformed cell never fails a row: it simply becomes absent.
//!
//! | rule                                   | `"  12.5 "` | `""` / `"   "` | `"abc"` |
//! |----------------------------------------|-------------|----------------|---------|
//! | numbers ([`coerce_number`])            | `Some(12.5)`| `None`         | `None`  |
//! | text ([`coerce_text`])                 | `"12.5"`    | `None`         | `"abc"` |
//!
//! Non-finite numbers (`NaN`, `inf`) are treated as absent as well.
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::constants::{Coordinate, Slug};

use super::slug::slugify;

/// One row of the waypoint table, after trimming and coercion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaypointRow {
    #[serde(deserialize_with = "optional_text")]
    pub rowid: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub pl_name: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub pl_slug: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub host_slug: Option<String>,

    #[serde(deserialize_with = "optional_number")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub y: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub z: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub sy_dist: Option<f64>,

    #[serde(deserialize_with = "optional_integer")]
    pub disc_year: Option<i32>,
    #[serde(deserialize_with = "optional_text")]
    pub discoverymethod: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub disc_facility: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub disc_refname: Option<String>,

    #[serde(deserialize_with = "optional_number")]
    pub pl_rade: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub pl_bmasse: Option<f64>,
    #[serde(deserialize_with = "optional_text")]
    pub pl_bmassprov: Option<String>,
    #[serde(deserialize_with = "optional_number")]
    pub pl_orbper: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub pl_orbsmax: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub pl_orbeccen: Option<f64>,

    #[serde(deserialize_with = "optional_integer")]
    pub sy_snum: Option<u32>,
    #[serde(deserialize_with = "optional_integer")]
    pub sy_pnum: Option<u32>,
    #[serde(deserialize_with = "optional_number")]
    pub sy_vmag: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub sy_gmag: Option<f64>,
    #[serde(deserialize_with = "optional_text")]
    pub st_spectype: Option<String>,
}

/// Fields a row must carry to be indexed, with slugs resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RequiredFields {
    pub planet_name: String,
    pub planet_slug: Slug,
    pub host_name: String,
    pub host_slug: Slug,
    pub coordinate: Coordinate,
}

impl WaypointRow {
    /// Row identity, `None` when the cell is empty or missing.
    pub fn identity(&self) -> Option<&str> {
        self.rowid.as_deref()
    }

    /// Position of the row, only when all three components are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.x?, self.y?, self.z?))
    }

    /// Resolve the fields needed to index the row.
    ///
    /// Slugs come from the slug columns when present, otherwise they are derived from the
    /// display names.
    ///
    /// Return
    /// ----------
    /// * `None` if the identity, either name, or part of the position is missing, or if a
    ///   name yields an empty slug.
    pub(crate) fn required_fields(&self) -> Option<RequiredFields> {
        self.identity()?;
        let planet_name = self.pl_name.clone()?;
        let host_name = self.hostname.clone()?;
        let coordinate = self.coordinate()?;

        let planet_slug = self
            .pl_slug
            .clone()
            .unwrap_or_else(|| slugify(&planet_name));
        let host_slug = self
            .host_slug
            .clone()
            .unwrap_or_else(|| slugify(&host_name));
        if planet_slug.is_empty() || host_slug.is_empty() {
            return None;
        }

        Some(RequiredFields {
            planet_name,
            planet_slug,
            host_name,
            host_slug,
            coordinate,
        })
    }
}

/// Trim a text cell; empty becomes absent.
pub fn coerce_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trim and parse a numeric cell; empty, unparsable or non-finite becomes absent.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let value = f64::from_str(raw.trim()).ok()?;
    value.is_finite().then_some(value)
}

/// Trim and parse an integer cell.
///
/// Integral decimals such as `"2014.0"` are accepted; fractional or out of range values
/// become absent.
pub fn coerce_integer<T>(raw: &str) -> Option<T>
where
    T: FromStr + TryFrom<i64>,
{
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<T>() {
        return Some(value);
    }
    let value = coerce_number(trimmed)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return None;
    }
    T::try_from(value as i64).ok()
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(coerce_text))
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(coerce_number))
}

fn optional_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + TryFrom<i64>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(coerce_integer::<T>))
}

#[cfg(test)]
mod waypoint_row_tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("   "), None);
        assert_eq!(coerce_number("  12.5 "), Some(12.5));
        assert_eq!(coerce_number("abc"), None);
        assert_eq!(coerce_number("-0.25"), Some(-0.25));
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(""), None);
        assert_eq!(coerce_text("  \t "), None);
        assert_eq!(coerce_text("  Transit "), Some("Transit".to_string()));
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer::<i32>(" 2014 "), Some(2014));
        assert_eq!(coerce_integer::<i32>("2014.0"), Some(2014));
        assert_eq!(coerce_integer::<i32>("2014.5"), None);
        assert_eq!(coerce_integer::<u32>("-1"), None);
        assert_eq!(coerce_integer::<u32>(""), None);
        assert_eq!(coerce_integer::<u32>("many"), None);
    }

    #[test]
    fn test_required_fields_derive_slugs() {
        let row = WaypointRow {
            rowid: Some("7".into()),
            pl_name: Some("55 Cnc e".into()),
            hostname: Some("55 Cnc".into()),
            x: Some(1.0),
            y: Some(2.0),
            z: Some(3.0),
            ..Default::default()
        };
        let fields = row.required_fields().unwrap();
        assert_eq!(fields.planet_slug, "55-cnc-e");
        assert_eq!(fields.host_slug, "55-cnc");
        assert_eq!(fields.coordinate, Coordinate::new(1.0, 2.0, 3.0));

        let explicit = WaypointRow {
            pl_slug: Some("janssen".into()),
            ..row.clone()
        };
        assert_eq!(explicit.required_fields().unwrap().planet_slug, "janssen");

        let unnamed = WaypointRow {
            pl_name: Some("***".into()),
            ..row
        };
        assert_eq!(unnamed.required_fields(), None);
    }
}
