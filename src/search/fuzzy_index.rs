//! Approximate name matching.
//!
//! Names are lowercased and split into alphanumeric tokens once, when the index is built.
//! A query is scored against every entry:
//!
//! | match                                   | score                         |
//! |-----------------------------------------|-------------------------------|
//! | whole name equal                        | `3.0`                         |
//! | name starts with the query              | `2.0 + coverage`              |
//! | name contains the query                 | `1.5 + coverage`              |
//! | otherwise, best Jaro-Winkler similarity | `similarity` if ≥ threshold   |
//!
//! `coverage` is the share of the name covered by the query, so shorter names rank first.
//! The similarity is taken against the whole name, each token, and the name prefix of the
//! query's length (which catches a misspelled partial input like `"keplr"`).
//! Ties keep index order.
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use strsim::jaro_winkler;

use super::SearchEntry;

/// Minimum Jaro-Winkler similarity for a non-substring match.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone)]
struct IndexedName {
    lowered: String,
    tokens: Vec<String>,
    char_len: usize,
}

/// Searchable index over a fixed set of entries.
#[derive(Debug, Clone, Default)]
pub struct FuzzyIndex {
    entries: Vec<SearchEntry>,
    names: Vec<IndexedName>,
}

impl FuzzyIndex {
    /// Build the index, matching on entry names only.
    pub fn build(entries: Vec<SearchEntry>) -> Self {
        let names = entries
            .iter()
            .map(|entry| {
                let lowered = entry.name.to_lowercase();
                let tokens = lowered
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                IndexedName {
                    char_len: lowered.chars().count(),
                    lowered,
                    tokens,
                }
            })
            .collect();

        FuzzyIndex { entries, names }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best matches for `text`, highest score first.
    ///
    /// Arguments
    /// -----------------
    /// * `text`: the user input; surrounding whitespace is ignored.
    /// * `limit`: maximum number of matches returned.
    ///
    /// Return
    /// ----------
    /// * Up to `limit` entries; empty for blank input.
    pub fn query(&self, text: &str, limit: usize) -> Vec<SearchEntry> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }
        let needle_len = needle.chars().count();

        self.names
            .iter()
            .enumerate()
            .filter_map(|(position, name)| {
                score(&needle, needle_len, name).map(|s| (position, s, name.char_len))
            })
            .sorted_by_key(|&(position, s, len)| (Reverse(OrderedFloat(s)), len, position))
            .take(limit)
            .map(|(position, _, _)| self.entries[position].clone())
            .collect()
    }
}

fn score(needle: &str, needle_len: usize, name: &IndexedName) -> Option<f64> {
    let coverage = needle_len as f64 / name.char_len.max(1) as f64;

    if name.lowered == needle {
        return Some(3.0);
    }
    if name.lowered.starts_with(needle) {
        return Some(2.0 + coverage);
    }
    if name.lowered.contains(needle) {
        return Some(1.5 + coverage);
    }

    let prefix: String = name.lowered.chars().take(needle_len).collect();
    let similarity = name
        .tokens
        .iter()
        .map(|token| jaro_winkler(needle, token))
        .chain([jaro_winkler(needle, &name.lowered), jaro_winkler(needle, &prefix)])
        .fold(0.0_f64, f64::max);

    (similarity >= SIMILARITY_THRESHOLD).then_some(similarity)
}
