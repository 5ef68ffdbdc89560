//! Platform directories used for configuration lookup

use std::path::PathBuf;

use etcetera::{BaseStrategy, choose_base_strategy};

/// Name of the configuration file, both per-project and per-user
pub const CONFIG_FILE_NAME: &str = "luabundle.toml";

/// Per-user configuration directory, e.g. `~/.config/luabundle`
pub fn user_config_dir() -> Option<PathBuf> {
    choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join("luabundle"))
}

/// Per-user configuration file, whether or not it exists
pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
