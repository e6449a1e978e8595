//! Semantic location map.
//!
//! Goals are expressed as lists of semantic location names. The map binds
//! each unique name to the metadata the planner and the navigation base
//! need: a display name, a description, a 2D pose and the keyframe the
//! localisation stack anchors the pose to.
//!
//! The map is loaded from a TOML document at daemon startup and may be
//! extended at runtime through the operator API. The `homebase` entry is
//! mandatory: recovery behaviours navigate back to it.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;

use crate::delivery::error::DeliveryError;

/// Unique name of the docking station every recovery returns to.
pub const HOMEBASE: &str = "homebase";

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Location {
    /// Key in the semantic map; not serialized inside the TOML table.
    #[serde(default)]
    pub unique_name: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pose: Pose2D,
    #[serde(default)]
    pub keyframe_id: i32,
}

#[derive(Debug, Deserialize)]
struct SemanticMapDocument {
    locations: std::collections::BTreeMap<String, Location>,
}

/// Concurrent map of semantic locations keyed by unique name.
///
/// Cheaply clonable; all clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct SemanticMap {
    locations: Arc<DashMap<String, Location>>,
}

impl SemanticMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a semantic map from a TOML document.
    ///
    /// Expects one `[locations.<unique_name>]` table per location and
    /// requires a `homebase` entry.
    pub fn from_toml_str(document: &str) -> Result<Self, DeliveryError> {
        let document: SemanticMapDocument = toml::from_str(document)
            .map_err(|e| DeliveryError::InvalidSemanticMap(e.to_string()))?;
        let map = Self::new();
        for (unique_name, mut location) in document.locations {
            location.unique_name = unique_name.clone();
            map.insert(location);
        }
        if map.get(HOMEBASE).is_none() {
            return Err(DeliveryError::MissingHomebase);
        }
        Ok(map)
    }

    pub fn insert(&self, location: Location) {
        self.locations.insert(location.unique_name.clone(), location);
    }

    pub fn get(&self, unique_name: &str) -> Option<Location> {
        self.locations.get(unique_name).map(|location| location.to_owned())
    }

    /// The docking station entry, if the map has one.
    pub fn homebase(&self) -> Result<Location, DeliveryError> {
        self.get(HOMEBASE).ok_or(DeliveryError::MissingHomebase)
    }

    /// All locations, sorted by unique name.
    pub fn list(&self) -> Vec<Location> {
        let mut locations: Vec<Location> =
            self.locations.iter().map(|entry| entry.value().to_owned()).collect();
        locations.sort_by(|a, b| a.unique_name.cmp(&b.unique_name));
        locations
    }

    /// Validate that every requested name resolves to a known location.
    pub fn check_locations(&self, names: &[String]) -> Result<(), DeliveryError> {
        for name in names {
            if self.get(name).is_none() {
                return Err(DeliveryError::UnknownLocation(name.to_owned()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [locations.homebase]
        name = "Homebase"
        description = "charging dock"
        pose = { x = 0.0, y = 0.0, theta = 0.0 }
        keyframe_id = 1

        [locations.sofa]
        name = "Sofa"
        pose = { x = 2.5, y = -1.0, theta = 1.57 }
        keyframe_id = 4
    "#;

    #[test]
    fn test_semantic_map_from_toml() {
        let map = SemanticMap::from_toml_str(SAMPLE).unwrap();
        let sofa = map.get("sofa").unwrap();
        assert_eq!(sofa.unique_name, "sofa");
        assert_eq!(sofa.name, "Sofa");
        assert_eq!(sofa.pose.x, 2.5);
        assert_eq!(map.homebase().unwrap().keyframe_id, 1);
    }

    #[test]
    fn test_semantic_map_requires_homebase() {
        let document = r#"
            [locations.sofa]
            name = "Sofa"
            pose = { x = 0.0, y = 0.0, theta = 0.0 }
        "#;
        assert_eq!(SemanticMap::from_toml_str(document).unwrap_err(), DeliveryError::MissingHomebase);
    }

    #[test]
    fn test_semantic_map_rejects_malformed_toml() {
        assert!(matches!(
            SemanticMap::from_toml_str("locations = 3"),
            Err(DeliveryError::InvalidSemanticMap(_))
        ));
    }

    #[test]
    fn test_check_locations() {
        let map = SemanticMap::from_toml_str(SAMPLE).unwrap();
        assert_eq!(map.check_locations(&["sofa".to_string()]), Ok(()));
        assert_eq!(
            map.check_locations(&["sofa".to_string(), "void".to_string()]),
            Err(DeliveryError::UnknownLocation("void".to_string()))
        );
    }

    #[test]
    fn test_list_is_sorted_by_unique_name() {
        let map = SemanticMap::from_toml_str(SAMPLE).unwrap();
        let names: Vec<String> = map.list().into_iter().map(|l| l.unique_name).collect();
        assert_eq!(names, vec!["homebase".to_string(), "sofa".to_string()]);
    }
}
