pub mod astris;
pub mod astris_errors;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod env_state;
pub mod localization;
pub mod logging;
pub mod reference;
pub mod search;
pub mod stars;
pub mod waypoints;

pub use astris::{Astris, CatalogLoader, PrefetchOutcome, PrefetchState, SourceLoader};
pub use astris_errors::AstrisError;
pub use catalog::{Catalog, CatalogStats};
pub use config::AstrisConfig;
pub use reference::{Reference, ReferencePoint};
