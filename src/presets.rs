use crate::types::{LsysError, System};

use std::sync::RwLock;
use tracing::warn;

// Systems found by earlier searches, all drawn at 60°.
const PRESET_TEXTS: [&str; 9] = [
    include_str!("../presets/hextooth.lsys"),
    include_str!("../presets/chain-of-stars.lsys"),
    include_str!("../presets/echoes.lsys"),
    include_str!("../presets/logo.lsys"),
    include_str!("../presets/labyrinth.lsys"),
    include_str!("../presets/layered-rosettes.lsys"),
    include_str!("../presets/folded-paper.lsys"),
    include_str!("../presets/aperture.lsys"),
    include_str!("../presets/romulan-war-bird.lsys"),
];

lazy_static::lazy_static! {
    pub static ref PRESETS: RwLock<Vec<System>> = RwLock::new(Vec::new());
}

pub struct PresetManager;

impl PresetManager {
    /// Parses the embedded presets into the shared cache, once.
    pub fn load() -> Result<(), LsysError> {
        if PRESETS.read().map(|p| !p.is_empty()).unwrap_or(false) {
            return Ok(());
        }

        let mut presets = Vec::new();

        for text in PRESET_TEXTS {
            match crate::parser::parse(text) {
                Ok(system) => presets.push(system),
                Err(e) => warn!("Failed to parse preset: {e}"),
            }
        }

        let mut write_guard = PRESETS
            .write()
            .map_err(|_| LsysError::FileError("Failed to acquire write lock".to_string()))?;
        *write_guard = presets;

        Ok(())
    }

    /// Get the number of available presets
    pub fn count() -> usize {
        let _ = Self::load();

        PRESETS.read().map(|presets| presets.len()).unwrap_or(0)
    }

    /// Get a preset by its index
    pub fn get_by_index(index: usize) -> Result<System, LsysError> {
        let _ = Self::load();

        PRESETS
            .read()
            .map_err(|_| LsysError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| LsysError::ValidationError(format!("Preset index {} out of range", index)))
    }

    /// Get a preset by its name, ignoring case
    pub fn get_by_name(name: &str) -> Result<System, LsysError> {
        let _ = Self::load();

        PRESETS
            .read()
            .map_err(|_| LsysError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|system| system.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| LsysError::ValidationError(format!("Preset '{}' not found", name)))
    }

    pub fn list_names() -> Vec<String> {
        let _ = Self::load();

        PRESETS
            .read()
            .map(|presets| presets.iter().map(|system| system.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Search for presets by name
    pub fn search(query: &str) -> Vec<usize> {
        let _ = Self::load();
        let query = query.to_lowercase();

        PRESETS
            .read()
            .map(|presets| {
                presets
                    .iter()
                    .enumerate()
                    .filter(|(_, system)| system.name.to_lowercase().contains(&query))
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_default()
    }
}
