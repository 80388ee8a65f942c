//! Navigation settings
//!
//! Typed model of the user-facing navigation preferences. Values load from the
//! `[navigation]` section of the TOML config and can be changed one key at a
//! time with [`NavigationSettings::apply_change`], which accepts the same
//! string values a preference list produces (entry index, snake_case name or
//! display label).
//!
//! Rules enforced here:
//! - Speed warning labels follow the distance unit (km/h or mi/h)
//! - Shortest-route modes only ever compute a single route

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

pub const K_ROUTE_TYPE: &str = "pref_route_type";
pub const K_DISTANCE_UNIT: &str = "pref_distance_unit";
pub const K_NAVIGATION_TYPE: &str = "pref_navigation_type";
pub const K_IN_TOWN_SPEED_WARNING: &str = "pref_speed_warnings_in_town";
pub const K_OUT_TOWN_SPEED_WARNING: &str = "pref_speed_warnings_out_town";
pub const K_ROUTES_NUMBER: &str = "pref_routes_number";
pub const K_AUTO_DAY_NIGHT: &str = "pref_auto_day_night";
pub const K_AVOID_TOLL_ROADS: &str = "pref_avoid_toll_roads";
pub const K_AVOID_FERRIES: &str = "pref_avoid_ferries";
pub const K_AVOID_HIGHWAYS: &str = "pref_avoid_highways";
pub const K_FREE_DRIVE: &str = "pref_free_drive";

/// Number of speed warning steps (5, 10, 15, 20, 25)
pub const SPEED_WARNING_STEPS: u8 = 5;

/// Maximum number of alternative routes
pub const MAX_ROUTES_NUMBER: u8 = 3;

/// Route calculation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    CarShortest,
    #[default]
    CarFastest,
    CarEfficient,
    Pedestrian,
    BicycleFastest,
    BicycleShortest,
    BicycleQuietest,
}

impl RouteType {
    const CHOICES: [(RouteType, &'static str, &'static str); 7] = [
        (RouteType::CarShortest, "car_shortest", "Car shortest"),
        (RouteType::CarFastest, "car_fastest", "Car fastest"),
        (RouteType::CarEfficient, "car_efficient", "Car efficient"),
        (RouteType::Pedestrian, "pedestrian", "Pedestrian"),
        (RouteType::BicycleFastest, "bicycle_fastest", "Bicycle fastest"),
        (RouteType::BicycleShortest, "bicycle_shortest", "Bicycle shortest"),
        (RouteType::BicycleQuietest, "bicycle_quietest", "Bicycle quietest"),
    ];

    /// Display label
    pub fn label(self) -> &'static str {
        label_of(self, &Self::CHOICES)
    }

    /// Shortest-route modes never offer alternatives
    pub fn is_shortest(self) -> bool {
        matches!(self, RouteType::CarShortest | RouteType::BicycleShortest)
    }
}

impl FromStr for RouteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(s, &Self::CHOICES, "route type")
    }
}

/// Distance display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    KilometersMeters,
    MilesFeet,
    MilesYards,
}

impl DistanceUnit {
    const CHOICES: [(DistanceUnit, &'static str, &'static str); 3] = [
        (DistanceUnit::KilometersMeters, "kilometers_meters", "Kilometers/Meters"),
        (DistanceUnit::MilesFeet, "miles_feet", "Miles/Feet"),
        (DistanceUnit::MilesYards, "miles_yards", "Miles/Yards"),
    ];

    pub fn label(self) -> &'static str {
        label_of(self, &Self::CHOICES)
    }

    pub fn is_metric(self) -> bool {
        self == DistanceUnit::KilometersMeters
    }

    /// Speed unit suffix used in speed warning labels
    pub fn speed_suffix(self) -> &'static str {
        if self.is_metric() {
            "km/h"
        } else {
            "mi/h"
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(s, &Self::CHOICES, "distance unit")
    }
}

/// Real GPS navigation or simulated drive along the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    Real,
    #[default]
    Simulation,
}

impl NavigationType {
    const CHOICES: [(NavigationType, &'static str, &'static str); 2] = [
        (NavigationType::Real, "real", "Real"),
        (NavigationType::Simulation, "simulation", "Simulation"),
    ];

    pub fn label(self) -> &'static str {
        label_of(self, &Self::CHOICES)
    }
}

impl FromStr for NavigationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(s, &Self::CHOICES, "navigation type")
    }
}

/// Speed warning option labels for a distance unit
///
/// Index `i` corresponds to a threshold of `(i + 1) * 5` over the limit.
pub fn speed_warning_options(unit: DistanceUnit) -> Vec<String> {
    (0..SPEED_WARNING_STEPS)
        .map(|index| speed_warning_label(index, unit))
        .collect()
}

/// Label for one speed warning index
pub fn speed_warning_label(index: u8, unit: DistanceUnit) -> String {
    format!("{}{}", speed_warning_offset(index), unit.speed_suffix())
}

/// Speed over the limit (in the current unit) that triggers a warning
pub fn speed_warning_offset(index: u8) -> u32 {
    (index as u32 + 1) * 5
}

/// Navigation preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    pub route_type: RouteType,
    pub distance_unit: DistanceUnit,
    pub navigation_type: NavigationType,
    /// Index into [`speed_warning_options`] for built-up areas
    pub speed_warning_in_town: u8,
    /// Index into [`speed_warning_options`] outside built-up areas
    pub speed_warning_out_town: u8,
    /// Requested number of alternative routes
    pub routes_number: u8,
    pub auto_day_night: bool,
    pub avoid_toll_roads: bool,
    pub avoid_ferries: bool,
    pub avoid_highways: bool,
    pub free_drive: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            route_type: RouteType::default(),
            distance_unit: DistanceUnit::default(),
            navigation_type: NavigationType::default(),
            speed_warning_in_town: 3,
            speed_warning_out_town: 3,
            routes_number: MAX_ROUTES_NUMBER,
            auto_day_night: false,
            avoid_toll_roads: false,
            avoid_ferries: false,
            avoid_highways: false,
            free_drive: false,
        }
    }
}

impl NavigationSettings {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        validate_speed_warning_index(self.speed_warning_in_town)?;
        validate_speed_warning_index(self.speed_warning_out_town)?;
        validate_routes_number(self.routes_number)?;
        Ok(())
    }

    /// True when the route type forces a single route
    pub fn routes_number_locked(&self) -> bool {
        self.route_type.is_shortest()
    }

    /// Number of routes that will actually be calculated
    pub fn effective_routes_number(&self) -> u8 {
        if self.routes_number_locked() {
            1
        } else {
            self.routes_number
        }
    }

    pub fn speed_warning_in_town_label(&self) -> String {
        speed_warning_label(self.speed_warning_in_town, self.distance_unit)
    }

    pub fn speed_warning_out_town_label(&self) -> String {
        speed_warning_label(self.speed_warning_out_town, self.distance_unit)
    }

    /// Apply a single preference change
    ///
    /// Invalid values leave the settings untouched.
    pub fn apply_change(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            K_ROUTE_TYPE => self.route_type = value.parse()?,
            K_DISTANCE_UNIT => self.distance_unit = value.parse()?,
            K_NAVIGATION_TYPE => self.navigation_type = value.parse()?,
            K_IN_TOWN_SPEED_WARNING => {
                self.speed_warning_in_town = parse_speed_warning_index(value)?;
            }
            K_OUT_TOWN_SPEED_WARNING => {
                self.speed_warning_out_town = parse_speed_warning_index(value)?;
            }
            K_ROUTES_NUMBER => {
                let number = parse_number(value, "routes number")?;
                validate_routes_number(number)?;
                self.routes_number = number;
            }
            K_AUTO_DAY_NIGHT => self.auto_day_night = parse_bool(value)?,
            K_AVOID_TOLL_ROADS => self.avoid_toll_roads = parse_bool(value)?,
            K_AVOID_FERRIES => self.avoid_ferries = parse_bool(value)?,
            K_AVOID_HIGHWAYS => self.avoid_highways = parse_bool(value)?,
            K_FREE_DRIVE => self.free_drive = parse_bool(value)?,
            other => {
                return Err(Error::NotFound(format!("Unknown preference key: {}", other)));
            }
        }

        debug!("Pref {} changed to {}", key, value);
        Ok(())
    }
}

fn label_of<T: Copy + PartialEq>(value: T, choices: &[(T, &'static str, &'static str)]) -> &'static str {
    choices
        .iter()
        .find(|(choice, _, _)| *choice == value)
        .map(|(_, _, label)| *label)
        .unwrap_or("")
}

/// Accepts an entry index, a snake_case name or a display label
fn parse_choice<T: Copy>(
    value: &str,
    choices: &[(T, &'static str, &'static str)],
    what: &str,
) -> Result<T> {
    let value = value.trim();

    if let Ok(index) = value.parse::<usize>() {
        return choices
            .get(index)
            .map(|(choice, _, _)| *choice)
            .ok_or_else(|| Error::InvalidInput(format!("{} index out of range: {}", what, index)));
    }

    choices
        .iter()
        .find(|(_, name, label)| value == *name || value.eq_ignore_ascii_case(label))
        .map(|(choice, _, _)| *choice)
        .ok_or_else(|| Error::InvalidInput(format!("Unknown {}: {}", what, value)))
}

fn parse_number(value: &str, what: &str) -> Result<u8> {
    value
        .trim()
        .parse::<u8>()
        .map_err(|e| Error::InvalidInput(format!("Invalid {} '{}': {}", what, value, e)))
}

fn parse_speed_warning_index(value: &str) -> Result<u8> {
    let index = parse_number(value, "speed warning index")?;
    validate_speed_warning_index(index)?;
    Ok(index)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidInput(format!("Invalid boolean: {}", other))),
    }
}

fn validate_speed_warning_index(index: u8) -> Result<()> {
    if index >= SPEED_WARNING_STEPS {
        return Err(Error::InvalidInput(format!(
            "Speed warning index {} out of range [0, {}]",
            index,
            SPEED_WARNING_STEPS - 1
        )));
    }
    Ok(())
}

fn validate_routes_number(number: u8) -> Result<()> {
    if number == 0 || number > MAX_ROUTES_NUMBER {
        return Err(Error::InvalidInput(format!(
            "Routes number {} out of range [1, {}]",
            number, MAX_ROUTES_NUMBER
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = NavigationSettings::default();
        assert_eq!(settings.distance_unit, DistanceUnit::KilometersMeters);
        assert_eq!(settings.navigation_type, NavigationType::Simulation);
        assert_eq!(settings.speed_warning_in_town_label(), "20km/h");
        assert_eq!(settings.speed_warning_out_town_label(), "20km/h");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_speed_warning_labels_follow_unit() {
        assert_eq!(
            speed_warning_options(DistanceUnit::KilometersMeters),
            vec!["5km/h", "10km/h", "15km/h", "20km/h", "25km/h"]
        );
        assert_eq!(
            speed_warning_options(DistanceUnit::MilesYards),
            vec!["5mi/h", "10mi/h", "15mi/h", "20mi/h", "25mi/h"]
        );

        let mut settings = NavigationSettings::default();
        settings.apply_change(K_DISTANCE_UNIT, "Miles/Feet").unwrap();
        assert_eq!(settings.speed_warning_in_town_label(), "20mi/h");
    }

    #[test]
    fn test_shortest_route_locks_routes_number() {
        let mut settings = NavigationSettings::default();
        assert_eq!(settings.effective_routes_number(), 3);

        settings.apply_change(K_ROUTE_TYPE, "Car shortest").unwrap();
        assert!(settings.routes_number_locked());
        assert_eq!(settings.effective_routes_number(), 1);

        settings.apply_change(K_ROUTE_TYPE, "bicycle_shortest").unwrap();
        assert_eq!(settings.effective_routes_number(), 1);

        settings.apply_change(K_ROUTE_TYPE, "1").unwrap();
        assert_eq!(settings.route_type, RouteType::CarFastest);
        assert_eq!(settings.effective_routes_number(), 3);
    }

    #[test]
    fn test_apply_change_rejects_bad_values() {
        let mut settings = NavigationSettings::default();
        let before = settings.clone();

        assert!(settings.apply_change(K_IN_TOWN_SPEED_WARNING, "5").is_err());
        assert!(settings.apply_change(K_ROUTES_NUMBER, "0").is_err());
        assert!(settings.apply_change(K_ROUTE_TYPE, "hovercraft").is_err());
        assert!(settings.apply_change(K_AVOID_FERRIES, "maybe").is_err());
        assert!(matches!(
            settings.apply_change("pref_unknown", "1"),
            Err(Error::NotFound(_))
        ));

        assert_eq!(settings, before);
    }

    #[test]
    fn test_apply_change_booleans() {
        let mut settings = NavigationSettings::default();
        settings.apply_change(K_AVOID_TOLL_ROADS, "true").unwrap();
        settings.apply_change(K_FREE_DRIVE, "1").unwrap();
        settings.apply_change(K_AUTO_DAY_NIGHT, "on").unwrap();
        assert!(settings.avoid_toll_roads);
        assert!(settings.free_drive);
        assert!(settings.auto_day_night);
        assert!(!settings.avoid_highways);
    }

    #[test]
    fn test_toml_section() {
        let settings: NavigationSettings = toml::from_str(
            r#"
            route_type = "pedestrian"
            distance_unit = "miles_feet"
            speed_warning_in_town = 0
            "#,
        )
        .unwrap();

        assert_eq!(settings.route_type, RouteType::Pedestrian);
        assert_eq!(settings.speed_warning_in_town_label(), "5mi/h");
        // Unspecified keys keep their defaults
        assert_eq!(settings.speed_warning_out_town, 3);
        assert_eq!(settings.navigation_type, NavigationType::Simulation);
    }
}
