//! Map catalog JSON parser
//!
//! The catalog has three sections:
//!
//! ```text
//! packages[]          download records, one per map package
//! world.continents[]  continent -> countries -> (states ->) cities
//! regions[]           region -> subRegions
//! ```
//!
//! `version`, `xmlVersion` and unknown keys are ignored. Packages without
//! a code or a type are skipped.

use crate::catalog::MapCatalog;
use crate::error::Result;
use crate::model::{BoundingBox, MapDownloadResource, MapType};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    packages: Vec<RawPackage>,
    #[serde(default)]
    world: Option<RawWorld>,
    #[serde(default)]
    regions: Vec<RawRegion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackage {
    package_code: Option<String>,
    #[serde(rename = "type")]
    map_type: Option<i64>,
    #[serde(default)]
    languages: Vec<RawName>,
    bbox: Option<RawBoundingBox>,
    #[serde(rename = "skmsize", default, deserialize_with = "lenient_size")]
    skm_size: Option<u64>,
    file: Option<String>,
    #[serde(rename = "nbzip")]
    nb_zip: Option<String>,
    #[serde(rename = "unzipsize", default, deserialize_with = "lenient_size")]
    unzip_size: Option<u64>,
    texture: Option<RawTexture>,
    #[serde(default, deserialize_with = "lenient_size")]
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawName {
    tl_name: Option<String>,
    lng_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoundingBox {
    lat_min: Option<f64>,
    lat_max: Option<f64>,
    long_min: Option<f64>,
    long_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTexture {
    #[serde(rename = "texturesbigfile")]
    textures_big_file: Option<String>,
    #[serde(rename = "sizebigfile", default, deserialize_with = "lenient_size")]
    size_big_file: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawWorld {
    #[serde(default)]
    continents: Vec<RawContinent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContinent {
    continent_code: Option<String>,
    #[serde(default)]
    countries: Vec<RawCountry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCountry {
    country_code: Option<String>,
    #[serde(default)]
    city_codes: Vec<RawCity>,
    #[serde(default)]
    state_codes: Vec<RawState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    state_code: Option<String>,
    #[serde(default)]
    city_codes: Vec<RawCity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCity {
    city_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRegion {
    region_code: Option<String>,
    #[serde(default)]
    sub_regions: Vec<RawSubRegion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubRegion {
    sub_region_code: Option<String>,
}

/// Byte size field that never fails the whole catalog
///
/// Accepts integers, integral floats (`1.5e3`) and numeric strings. Anything
/// else (negative, fractional, wrong type) is logged and treated as missing.
fn lenient_size<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| size_from_value(&value)))
}

fn size_from_value(value: &Value) -> Option<u64> {
    let size = match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    if size.is_none() && !value.is_null() {
        warn!("Ignoring invalid size value {}", value);
    }
    size
}

/// Parse a catalog from a JSON string
pub fn parse_str(json: &str) -> Result<MapCatalog> {
    let raw: RawCatalog = serde_json::from_str(json)?;
    Ok(build_catalog(raw))
}

/// Parse a catalog from a reader
pub fn parse_reader<R: Read>(reader: R) -> Result<MapCatalog> {
    let raw: RawCatalog = serde_json::from_reader(reader)?;
    Ok(build_catalog(raw))
}

fn build_catalog(raw: RawCatalog) -> MapCatalog {
    let map_parents = raw
        .world
        .map(|world| world_hierarchy(world.continents))
        .unwrap_or_default();
    let region_parents = region_hierarchy(raw.regions);

    let total = raw.packages.len();
    let maps: Vec<MapDownloadResource> = raw
        .packages
        .into_iter()
        .filter_map(|package| into_resource(package, &map_parents))
        .collect();

    debug!(
        "Parsed {} of {} packages, {} hierarchy links, {} region links",
        maps.len(),
        total,
        map_parents.len(),
        region_parents.len()
    );

    MapCatalog {
        maps,
        map_parents,
        region_parents,
    }
}

fn into_resource(
    package: RawPackage,
    map_parents: &HashMap<String, String>,
) -> Option<MapDownloadResource> {
    let (code, type_code) = match (package.package_code, package.map_type) {
        (Some(code), Some(type_code)) => (code, type_code),
        (code, _) => {
            debug!("Skipping package without code or type: {:?}", code);
            return None;
        }
    };

    let names: BTreeMap<String, String> = package
        .languages
        .into_iter()
        .filter_map(|name| Some((name.lng_code?, name.tl_name?)))
        .collect();

    let bbox = package.bbox.unwrap_or_default();
    let bounding_box = BoundingBox {
        lat_min: bbox.lat_min.unwrap_or_default(),
        lat_max: bbox.lat_max.unwrap_or_default(),
        long_min: bbox.long_min.unwrap_or_default(),
        long_max: bbox.long_max.unwrap_or_default(),
    };

    let (txg_file_path, txg_file_size) = match package.texture {
        Some(texture) => (
            texture.textures_big_file.unwrap_or_default(),
            texture.size_big_file.unwrap_or_default(),
        ),
        None => (String::new(), 0),
    };

    let parent_code = map_parents.get(&code).cloned().unwrap_or_default();

    Some(MapDownloadResource {
        map_type: MapType::from_code(type_code),
        names,
        bounding_box,
        skm_file_size: package.skm_size.unwrap_or_default(),
        skm_file_path: package.file.unwrap_or_default(),
        zip_file_path: package.nb_zip.unwrap_or_default(),
        unzipped_file_size: package.unzip_size.unwrap_or_default(),
        txg_file_path,
        txg_file_size,
        skm_and_zip_files_size: package.size.unwrap_or_default(),
        parent_code,
        download_path: String::new(),
        code,
    })
}

/// code -> parent code; continents map to ""
fn world_hierarchy(continents: Vec<RawContinent>) -> HashMap<String, String> {
    let mut parents = HashMap::new();

    for continent in continents {
        if let Some(code) = &continent.continent_code {
            parents.insert(code.clone(), String::new());
        }

        for country in continent.countries {
            if let (Some(continent_code), Some(country_code)) =
                (&continent.continent_code, &country.country_code)
            {
                parents.insert(country_code.clone(), continent_code.clone());
            }

            link_cities(&mut parents, country.country_code.as_deref(), country.city_codes);

            for state in country.state_codes {
                if let (Some(country_code), Some(state_code)) =
                    (&country.country_code, &state.state_code)
                {
                    parents.insert(state_code.clone(), country_code.clone());
                }
                link_cities(&mut parents, state.state_code.as_deref(), state.city_codes);
            }
        }
    }

    parents
}

fn link_cities(parents: &mut HashMap<String, String>, parent: Option<&str>, cities: Vec<RawCity>) {
    let Some(parent) = parent else {
        return;
    };
    for city in cities {
        if let Some(city_code) = city.city_code {
            parents.insert(city_code, parent.to_string());
        }
    }
}

/// sub-region code -> region code
fn region_hierarchy(regions: Vec<RawRegion>) -> HashMap<String, String> {
    let mut parents = HashMap::new();
    for region in regions {
        let Some(region_code) = region.region_code else {
            continue;
        };
        for sub_region in region.sub_regions {
            if let Some(code) = sub_region.sub_region_code {
                parents.insert(code, region_code.clone());
            }
        }
    }
    parents
}
