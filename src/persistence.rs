//! Snapshot and crash-report files
//!
//! The kernel hands over one opaque snapshot value; file naming, format
//! and directory layout live here and nowhere else.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::error::{HollowError, Result};
use crate::world::WorldSnapshot;

pub const SAVE_DIR: &str = "saves";
const CRASH_FILE: &str = "crash_report.json";

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Write a timestamped snapshot file under `dir`, returning its path
pub fn save_snapshot(snapshot: &WorldSnapshot, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("save_{}.json", unix_seconds()));
    let file = File::create(&path)?;
    serde_json::to_writer(BufWriter::new(file), snapshot)?;
    tracing::info!(path = %path.display(), "snapshot saved");
    Ok(path)
}

pub fn load_snapshot(path: &Path) -> Result<WorldSnapshot> {
    let file = File::open(path)?;
    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(snapshot)
}

/// Best-effort crash diagnostic written before shutdown. Never touches
/// existing save files.
#[derive(Debug, Serialize, Deserialize)]
pub struct CrashReport {
    pub unix_time: u64,
    pub context: String,
    pub error: String,
}

pub fn write_crash_report(dir: &Path, context: &str, error: &HollowError) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(CRASH_FILE);
    let report = CrashReport {
        unix_time: unix_seconds(),
        context: context.to_string(),
        error: error.to_string(),
    };
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Entity, EntityKind};
    use crate::core::config::SimulationConfig;
    use crate::core::types::Vec2;
    use crate::world::building::BuildingId;
    use crate::world::structures::StructureKind;
    use crate::world::terrain::ScenarioKind;
    use crate::world::WorldModel;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hollowmere_test_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_snapshot_roundtrip_through_disk() {
        let cfg = SimulationConfig::default();
        let mut world = WorldModel::new(ScenarioKind::Meadow, 5, &cfg);
        let building = world.map.add_building((0, 0));
        world.spawn(Entity::new(
            "Hearth",
            Vec2::new(0.5, 0.5),
            EntityKind::Home { building },
        ));
        world.map.add_structure((7, 7), StructureKind::Road);
        world.tick_count = 42;

        let dir = temp_dir("roundtrip");
        let path = save_snapshot(&world.snapshot(), &dir).expect("save");
        let loaded = load_snapshot(&path).expect("load");
        let restored = WorldModel::restore(loaded).expect("restore");

        assert_eq!(restored.tick_count, 42);
        assert_eq!(restored.registry.len(), world.registry.len());
        assert_eq!(restored.map.overlay().len(), 1);
        assert_eq!(
            restored.map.building(BuildingId(0)).map(|b| b.level()),
            Some(1)
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_crash_report_is_written() {
        let dir = temp_dir("crash");
        let err = HollowError::Snapshot("test failure".into());
        let path = write_crash_report(&dir, "during tests", &err).expect("write");
        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("test failure"));
        assert!(text.contains("during tests"));
        let _ = fs::remove_dir_all(&dir);
    }
}
