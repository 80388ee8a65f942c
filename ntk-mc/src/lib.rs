//! # NTK Map Catalog Library (ntk-mc)
//!
//! Parses the map-catalog JSON that lists downloadable map packages into
//! [`MapDownloadResource`] records and two parent maps: the world hierarchy
//! (continent, country, state, city) and the region hierarchy.

pub mod catalog;
pub mod error;
pub mod model;
pub mod parser;

pub use catalog::MapCatalog;
pub use error::{Error, Result};
pub use model::{BoundingBox, MapDownloadResource, MapType};
