use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A saved location. New entries always carry `x` and `z`; the height is
/// optional. Older documents may hold a `null` `z`, which loads as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: i64,
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub z: Option<i64>,
    pub added_by: u64,
    /// `%m/%d/%y`, kept as text so existing documents load unchanged.
    pub added_at: String,
}

impl Waypoint {
    /// `X: 1, Y: 64, Z: -3` (the `Y` part only when set, `Z: ?` when unknown).
    pub fn coordinates(&self) -> String {
        let z = self.z.map_or_else(|| "?".to_string(), |z| z.to_string());
        match self.y {
            Some(y) => format!("X: {}, Y: {}, Z: {}", self.x, y, z),
            None => format!("X: {}, Z: {}", self.x, z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub x: i64,
    pub y: Option<i64>,
    pub z: i64,
}

/// `{ guild_id: { lowercase_name: waypoint } }`
pub type WaypointDocument = BTreeMap<u64, BTreeMap<String, Waypoint>>;

/// Title-case a stored (lowercase) name for display.
pub fn display_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_omit_missing_height() {
        let mut wp = Waypoint {
            x: 100,
            y: None,
            z: Some(-20),
            added_by: 1,
            added_at: "01/02/24".into(),
        };
        assert_eq!(wp.coordinates(), "X: 100, Z: -20");
        wp.y = Some(64);
        assert_eq!(wp.coordinates(), "X: 100, Y: 64, Z: -20");
    }

    #[test]
    fn reads_documents_with_null_height() {
        let wp: Waypoint = serde_json::from_str(
            r#"{"x": 1, "y": null, "z": 2, "added_by": 99, "added_at": "05/06/24"}"#,
        )
        .unwrap();
        assert_eq!(wp.y, None);
        assert_eq!(wp.added_by, 99);
    }

    #[test]
    fn reads_documents_with_null_z() {
        let wp: Waypoint = serde_json::from_str(
            r#"{"x": 1, "y": 64, "z": null, "added_by": 5, "added_at": "05/06/24"}"#,
        )
        .unwrap();
        assert_eq!(wp.z, None);
        assert_eq!(wp.coordinates(), "X: 1, Y: 64, Z: ?");
    }

    #[test]
    fn display_names_are_title_cased() {
        assert_eq!(display_name("home base"), "Home Base");
        assert_eq!(display_name("nether  portal"), "Nether  Portal");
    }
}
