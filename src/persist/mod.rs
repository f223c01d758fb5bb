//! Snapshot persistence behind an opaque collaborator
//!
//! The core treats storage as load-once, save-after-every-operation.
//! Saves are best-effort from the command layer's point of view; this
//! module only reports the failure.

use std::fs;
use std::path::PathBuf;

use crate::core::error::Result;
use crate::world::WorldState;

/// Storage collaborator for world snapshots
pub trait Persistence: Send + Sync {
    /// Load the last snapshot, or None when no snapshot exists yet
    fn load(&self) -> Result<Option<WorldState>>;

    /// Persist the given snapshot
    fn save(&self, world: &WorldState) -> Result<()>;
}

/// Whole-snapshot JSON storage in a single file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> Result<Option<WorldState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let world = serde_json::from_str(&contents)?;
        Ok(Some(world))
    }

    fn save(&self, world: &WorldState) -> Result<()> {
        // Write to a sibling temp file first so a crash mid-write never
        // truncates the last good snapshot
        let json = serde_json::to_string_pretty(world)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::unit::Echelon;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fireline-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("roundtrip");
        let store = JsonFileStore::new(&path);

        let mut world = WorldState::new();
        let unit_id = world.add_unit("3rd Platoon", Echelon::Platoon, GeoPoint::new(4.6, -74.0), 100).unwrap();
        store.save(&world).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.unit(unit_id).is_some());
        assert_eq!(loaded.history.len(), world.history.len());

        let _ = fs::remove_file(path);
    }
}
