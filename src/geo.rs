use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

use crate::record::clean_feeder_name;

/// Maps feeder names to `(latitude, longitude)` pairs for map rendering.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "Bombo 1": [0.883, 32.533],
///   "Kawempe South": [0.386, 32.560]
/// }
/// ```
/// Keys are canonicalized on load and lookups are canonicalized on query,
/// so the file does not have to match worksheet formatting exactly.
pub struct FeederLocations {
    entries: HashMap<String, (f64, f64)>,
}

impl FeederLocations {
    /// Loads the reference table from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: HashMap<String, (f64, f64)> = serde_json::from_str(&content)?;
        Ok(Self::from_entries(raw))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, (f64, f64))>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, coords)| (clean_feeder_name(&name), coords))
                .collect(),
        }
    }

    /// Returns the coordinates for `feeder`, if the reference table has them.
    pub fn get(&self, feeder: &str) -> Option<(f64, f64)> {
        self.entries.get(&clean_feeder_name(feeder)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_lookup_canonicalizes_both_sides() {
        let locations = FeederLocations::from_entries([
            ("bombo  1".to_string(), (0.883, 32.533)),
            ("KAWEMPE SOUTH".to_string(), (0.386, 32.560)),
        ]);

        assert_eq!(locations.get("Bombo\u{00A0}1"), Some((0.883, 32.533)));
        assert_eq!(locations.get("kawempe south"), Some((0.386, 32.560)));
        assert_eq!(locations.get("Unknown Feeder"), None);
    }

    #[test]
    fn test_load_from_json_file() {
        let path = format!("{}/feeder_locations_test.json", env::temp_dir().display());
        fs::write(&path, r#"{"Bombo 1": [0.883, 32.533]}"#).unwrap();

        let locations = FeederLocations::load(&path).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations.get("BOMBO 1"), Some((0.883, 32.533)));

        fs::remove_file(&path).unwrap();
    }
}
