use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;

use crate::dirs;

/// How the bundle is written to its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Append to the destination; repeated runs accumulate bundles
    #[default]
    Append,
    /// Truncate the destination first; repeated runs are idempotent
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Inserted between the target's stem and extension, `main.lua` -> `main_new.lua`
    pub output_suffix: String,
    pub output_mode: OutputMode,
    /// Aliases ending with this suffix are looked up under `utils_table`
    pub utils_alias_suffix: String,
    pub utils_table: String,
    /// Comment line opening the inlined prologue
    pub begin_marker: String,
    /// Comment line closing the inlined prologue
    pub end_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_suffix: "_new".to_owned(),
            output_mode: OutputMode::Append,
            utils_alias_suffix: "_utils".to_owned(),
            utils_table: "utils".to_owned(),
            begin_marker: "------------------import functions begin------------------".to_owned(),
            end_marker: "------------------import functions end------------------".to_owned(),
        }
    }
}

impl Config {
    /// Load configuration, using the first file found among: the explicit
    /// path, `./luabundle.toml`, and the per-user config file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let candidates: Vec<PathBuf> = std::iter::once(PathBuf::from(dirs::CONFIG_FILE_NAME))
            .chain(dirs::user_config_file())
            .collect();

        for candidate in candidates {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
