// Data-driven configuration for the krystals folder.
//
// The hosting application decides where krystals live and which file suffix
// they use; `KrystalsConfig` carries those two choices, loaded from JSON.
// Every field has a default, so an empty object (or no config file at all)
// gives a usable setup: `./krystals` with the `.krys` suffix.
//
// See also: `folder.rs`, which turns a config into a `KrystalsFolder`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::KrystalError;

/// Where krystal files are stored and how they are named.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrystalsConfig {
    /// Folder against which all krystal file names are resolved.
    pub krystals_folder: PathBuf,
    /// Appended to every generated file name, including the leading dot.
    pub filename_suffix: String,
}

impl Default for KrystalsConfig {
    fn default() -> Self {
        KrystalsConfig {
            krystals_folder: PathBuf::from("krystals"),
            filename_suffix: ".krys".to_owned(),
        }
    }
}

impl KrystalsConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, KrystalError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> Result<Self, KrystalError> {
        Ok(serde_json::from_str(json)?)
    }
}
