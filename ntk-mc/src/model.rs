//! Map catalog records

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of downloadable map package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    Country,
    City,
    Continent,
    Region,
    State,
    /// Type code outside the known range
    Unknown,
}

impl MapType {
    /// Map the catalog's integer type code
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => MapType::Country,
            1 => MapType::City,
            2 => MapType::Continent,
            3 => MapType::Region,
            4 => MapType::State,
            _ => MapType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MapType::Country => "country",
            MapType::City => "city",
            MapType::Continent => "continent",
            MapType::Region => "region",
            MapType::State => "state",
            MapType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic extent of a package, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub long_min: f64,
    pub long_max: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, long: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat)
            && (self.long_min..=self.long_max).contains(&long)
    }
}

/// One downloadable map package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDownloadResource {
    /// Package code (e.g. "DE", "USCA")
    pub code: String,
    pub map_type: MapType,
    /// Localised names keyed by language code
    pub names: BTreeMap<String, String>,
    pub bounding_box: BoundingBox,
    pub skm_file_size: u64,
    pub skm_file_path: String,
    pub zip_file_path: String,
    pub unzipped_file_size: u64,
    pub txg_file_path: String,
    pub txg_file_size: u64,
    /// Combined size of the SKM and ZIP files
    pub skm_and_zip_files_size: u64,
    /// Code of the enclosing package, empty for roots
    pub parent_code: String,
    pub download_path: String,
}

impl MapDownloadResource {
    /// Name in the given language
    pub fn name(&self, language: &str) -> Option<&str> {
        self.names.get(language).map(String::as_str)
    }

    /// Name in the given language, else English, else the package code
    pub fn display_name(&self, language: &str) -> &str {
        self.name(language)
            .or_else(|| self.name("en"))
            .unwrap_or(&self.code)
    }

    /// Total bytes on disk once downloaded and unpacked
    pub fn installed_size(&self) -> u64 {
        self.skm_file_size + self.unzipped_file_size + self.txg_file_size
    }
}
