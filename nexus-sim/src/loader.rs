use anyhow::{Context, Result};
use nexus_core::{
    AllianceRecord, EngineConfig, MemoryStore, PlayerInputs, PlayerRecord, RuleBook,
};
use nexus_data::EdictCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// On-disk world: every player and alliance, plus commands to run before the
/// first turn.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorldFile {
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub alliances: Vec<AllianceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<PlayerInputs>,
}

impl WorldFile {
    /// Reject duplicate ids before they silently overwrite each other in the
    /// store maps.
    fn check_ids(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for p in &self.players {
            if !seen.insert(p.id) {
                anyhow::bail!("duplicate player id {}", p.id);
            }
        }
        let mut seen = BTreeSet::new();
        for a in &self.alliances {
            if !seen.insert(a.id) {
                anyhow::bail!("duplicate alliance id {}", a.id);
            }
        }
        Ok(())
    }

    pub fn into_store(self) -> (MemoryStore, Vec<PlayerInputs>) {
        (MemoryStore::new(self.players, self.alliances), self.inputs)
    }

    pub fn from_store(store: &MemoryStore) -> Self {
        Self {
            players: store.players(),
            alliances: store.alliances(),
            inputs: Vec::new(),
        }
    }
}

pub fn load_world(path: &Path) -> Result<WorldFile> {
    log::info!("Loading world from {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read world file {}", path.display()))?;
    let world: WorldFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse world file {}", path.display()))?;
    world.check_ids()?;
    log::info!(
        "Loaded {} players, {} alliances, {} command sets",
        world.players.len(),
        world.alliances.len(),
        world.inputs.len()
    );
    Ok(world)
}

pub fn write_world(path: &Path, world: &WorldFile) -> Result<()> {
    let json = serde_json::to_string_pretty(world)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write world file {}", path.display()))?;
    log::info!("Wrote world to {:?}", path);
    Ok(())
}

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

pub fn load_rules(edicts: Option<&Path>) -> Result<RuleBook> {
    match edicts {
        Some(path) => {
            let catalog = EdictCatalog::load(path)
                .with_context(|| format!("Failed to load edicts from {}", path.display()))?;
            log::info!("Loaded {} edicts", catalog.len());
            Ok(RuleBook::with_edicts(catalog))
        }
        None => Ok(RuleBook::builtin()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_world_uses_defaults() {
        let file = write_temp(r#"{"players": [{"id": 1, "name": "ada"}]}"#);
        let world = load_world(file.path()).unwrap();
        assert_eq!(world.players.len(), 1);
        assert_eq!(world.players[0].progression.level, 1);
        assert!(world.alliances.is_empty());
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let file = write_temp(
            r#"{"players": [{"id": 1, "name": "a"}, {"id": 1, "name": "b"}]}"#,
        );
        let err = load_world(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate player id"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_world(Path::new("/nonexistent/world.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/world.json"));
    }

    #[test]
    fn test_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
    }
}
