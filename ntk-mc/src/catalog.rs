//! Parsed map catalog and hierarchy queries

use crate::error::{Error, Result};
use crate::model::{MapDownloadResource, MapType};
use crate::parser;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Download records plus the two parent maps of the catalog
#[derive(Debug, Clone, Default)]
pub struct MapCatalog {
    pub maps: Vec<MapDownloadResource>,
    /// Package code -> parent package code ("" for continents)
    pub map_parents: HashMap<String, String>,
    /// Sub-region code -> region code
    pub region_parents: HashMap<String, String>,
}

impl MapCatalog {
    /// Read and parse a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = parser::parse_reader(std::io::BufReader::new(file))?;
        info!(
            "Loaded map catalog {} ({} packages)",
            path.display(),
            catalog.maps.len()
        );
        Ok(catalog)
    }

    pub fn find(&self, code: &str) -> Option<&MapDownloadResource> {
        self.maps.iter().find(|map| map.code == code)
    }

    pub fn of_type(&self, map_type: MapType) -> impl Iterator<Item = &MapDownloadResource> {
        self.maps.iter().filter(move |map| map.map_type == map_type)
    }

    /// Parent chain of `code`, nearest first
    ///
    /// Stops at a root (empty or missing parent) or at the first code seen
    /// twice.
    pub fn ancestors(&self, code: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([code]);
        let mut current = code;

        while let Some(parent) = self.map_parents.get(current) {
            if parent.is_empty() || !seen.insert(parent.as_str()) {
                break;
            }
            chain.push(parent.as_str());
            current = parent;
        }

        chain
    }

    /// Direct children of `code`, sorted
    pub fn children(&self, code: &str) -> Vec<&str> {
        let mut children: Vec<&str> = self
            .map_parents
            .iter()
            .filter(|(_, parent)| parent.as_str() == code)
            .map(|(child, _)| child.as_str())
            .collect();
        children.sort_unstable();
        children
    }

    /// Region a sub-region belongs to
    pub fn region_of(&self, code: &str) -> Option<&str> {
        self.region_parents.get(code).map(String::as_str)
    }
}

impl std::str::FromStr for MapCatalog {
    type Err = Error;

    fn from_str(json: &str) -> Result<Self> {
        parser::parse_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(links: &[(&str, &str)]) -> MapCatalog {
        MapCatalog {
            map_parents: links
                .iter()
                .map(|(child, parent)| (child.to_string(), parent.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ancestors() {
        let catalog = catalog_with(&[("EUR", ""), ("DE", "EUR"), ("DEBER", "DE")]);
        assert_eq!(catalog.ancestors("DEBER"), vec!["DE", "EUR"]);
        assert_eq!(catalog.ancestors("EUR"), Vec::<&str>::new());
        assert_eq!(catalog.ancestors("UNKNOWN"), Vec::<&str>::new());
    }

    #[test]
    fn test_ancestors_cycle_safe() {
        let catalog = catalog_with(&[("A", "B"), ("B", "C"), ("C", "A")]);
        assert_eq!(catalog.ancestors("A"), vec!["B", "C"]);

        let catalog = catalog_with(&[("SELF", "SELF")]);
        assert!(catalog.ancestors("SELF").is_empty());
    }

    #[test]
    fn test_children() {
        let catalog = catalog_with(&[("EUR", ""), ("FR", "EUR"), ("DE", "EUR"), ("DEBER", "DE")]);
        assert_eq!(catalog.children("EUR"), vec!["DE", "FR"]);
        assert_eq!(catalog.children("DEBER"), Vec::<&str>::new());
        assert_eq!(catalog.children(""), vec!["EUR"]);
    }

    #[test]
    fn test_from_str_and_find() {
        let catalog: MapCatalog = r#"{"packages": [
            {"packageCode": "EUR", "type": 2},
            {"packageCode": "DE", "type": 0}
        ]}"#
        .parse()
        .unwrap();
        assert_eq!(catalog.find("DE").map(|m| m.map_type), Some(MapType::Country));
        assert!(catalog.find("FR").is_none());
        assert_eq!(catalog.of_type(MapType::Continent).count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MapCatalog::load(&dir.path().join("maps.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
