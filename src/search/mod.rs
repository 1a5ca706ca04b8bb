//! # Name search over planets and host systems
//!
//! Modules
//! -----------------
//! * [`fuzzy_index`] – Approximate matcher tolerating partial input and misspellings.
//! * [`search_worker`] – Task owning the index; builds and queries are requests answered
//!   over channels so index construction never blocks the caller.
pub mod fuzzy_index;
pub mod search_worker;

use crate::constants::Slug;

/// What a search entry navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Planet,
    System,
}

/// A searchable name and the waypoint it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub name: String,
    pub slug: Slug,
    pub kind: EntryKind,
}

impl SearchEntry {
    /// Navigation route of the entry.
    pub fn route(&self) -> String {
        match self.kind {
            EntryKind::Planet => format!("/planets/{}", self.slug),
            EntryKind::System => format!("/systems/{}", self.slug),
        }
    }
}
