use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};

use crate::logger::{info, warn};

pub const DEFAULT_CORPUS_EXTENSIONS: [&str; 4] = ["txt", "rtf", "html", "htm"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Folders scanned for commentary modules.
    pub commentary_folders: Vec<PathBuf>,
    /// Folders scanned for Bible text modules.
    pub bible_folders: Vec<PathBuf>,
    /// Folder of `*.dct.twm` dictionaries.
    pub dictionary_folder: Option<PathBuf>,
    /// Folders of tagged corpus documents.
    pub corpus_folders: Vec<PathBuf>,
    /// Extensions without the dot, e.g. `txt`.
    pub corpus_extensions: Vec<String>,
    pub use_tag_index: bool,
    pub tag_index_cache_capacity: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            commentary_folders: Vec::new(),
            bible_folders: Vec::new(),
            dictionary_folder: None,
            corpus_folders: Vec::new(),
            corpus_extensions: DEFAULT_CORPUS_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            use_tag_index: true,
            tag_index_cache_capacity: 32,
        }
    }
}

impl AppSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: AppSettings = serde_json::from_str(json).context("Failed to parse settings JSON")?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize settings")
    }

    /// Settings from `path`. A missing or malformed file gives the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return AppSettings::default();
        }

        let parsed = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|s| AppSettings::from_json(&s));

        match parsed {
            Ok(settings) => settings,
            Err(e) => {
                warn(&format!("Using default settings: {:#}", e));
                AppSettings::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?).with_context(|| format!("Failed to write {}", path.display()))?;
        info(&format!("Saved settings: {}", path.display()));
        Ok(())
    }

    /// Settings from `settings.json` in the application directory.
    pub fn load() -> Self {
        match crate::get_settings_path() {
            Ok(p) => AppSettings::load_from(&p),
            Err(e) => {
                warn(&format!("No settings path: {}", e));
                AppSettings::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let p = crate::get_settings_path().map_err(|e| anyhow::anyhow!("{}", e))?;
        self.save_to(&p)
    }
}
