//! Map catalog integration tests
//!
//! Load a small but complete catalog file from disk and query it.

use ntk_mc::{Error, MapCatalog, MapType};
use std::io::Write;

const CATALOG: &str = r#"{
    "version": 12,
    "xmlVersion": "2.3",
    "packages": [
        {"packageCode": "EUR", "type": 2, "languages": [{"tlName": "Europe", "lngCode": "en"}], "size": 10},
        {"packageCode": "DE", "type": 0, "languages": [{"tlName": "Germany", "lngCode": "en"}, {"tlName": "Deutschland", "lngCode": "de"}],
         "bbox": {"latMin": 47.2, "latMax": 55.1, "longMin": 5.8, "longMax": 15.1},
         "file": "DE.skm", "skmsize": 100, "nbzip": "DE.nbz", "unzipsize": 200, "size": 150},
        {"packageCode": "DEBER", "type": 1, "languages": [{"tlName": "Berlin", "lngCode": "en"}]},
        {"packageCode": "NAM", "type": 2},
        {"packageCode": "US", "type": 0},
        {"packageCode": "USCA", "type": 4, "languages": [{"tlName": "California", "lngCode": "en"}]},
        {"packageCode": "USSF", "type": 1},
        {"packageCode": "EUW", "type": 3},
        {"type": 0, "file": "nameless.skm"}
    ],
    "world": {
        "continents": [
            {"continentCode": "EUR", "countries": [
                {"countryCode": "DE", "cityCodes": [{"cityCode": "DEBER"}]},
                {"countryCode": "FR"}
            ]},
            {"continentCode": "NAM", "countries": [
                {"countryCode": "US", "stateCodes": [
                    {"stateCode": "USCA", "cityCodes": [{"cityCode": "USSF"}]}
                ]}
            ]}
        ]
    },
    "regions": [
        {"regionCode": "EUW", "subRegions": [{"subRegionCode": "FR"}, {"subRegionCode": "DE"}]}
    ]
}"#;

fn load_catalog() -> MapCatalog {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    MapCatalog::load(file.path()).unwrap()
}

#[test]
fn test_load_catalog_file() {
    let catalog = load_catalog();

    assert_eq!(catalog.maps.len(), 8);
    assert_eq!(catalog.of_type(MapType::Continent).count(), 2);
    assert_eq!(catalog.of_type(MapType::Country).count(), 2);
    assert_eq!(catalog.of_type(MapType::City).count(), 2);
    assert_eq!(catalog.of_type(MapType::State).count(), 1);
    assert_eq!(catalog.of_type(MapType::Region).count(), 1);

    let germany = catalog.find("DE").unwrap();
    assert_eq!(germany.display_name("de"), "Deutschland");
    assert_eq!(germany.parent_code, "EUR");
    assert_eq!(germany.installed_size(), 300);
    assert!(germany.bounding_box.contains(52.5, 13.4));
}

#[test]
fn test_hierarchy_queries() {
    let catalog = load_catalog();

    assert_eq!(catalog.ancestors("USSF"), vec!["USCA", "US", "NAM"]);
    assert_eq!(catalog.ancestors("DEBER"), vec!["DE", "EUR"]);
    assert_eq!(catalog.children("EUR"), vec!["DE", "FR"]);
    assert_eq!(catalog.children(""), vec!["EUR", "NAM"]);
    assert_eq!(catalog.region_of("FR"), Some("EUW"));
    assert_eq!(catalog.region_of("US"), None);

    // Hierarchy entries exist even without a package record
    assert!(catalog.find("FR").is_none());
    assert_eq!(catalog.map_parents["FR"], "EUR");
}

#[test]
fn test_truncated_catalog_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&CATALOG.as_bytes()[..200]).unwrap();
    assert!(matches!(MapCatalog::load(file.path()), Err(Error::Json(_))));
}
