//! Application configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! in the user config directory, then `VELO_*` environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Catalog endpoint used when the config file does not name one.
pub const DEFAULT_API_URL: &str = "https://6703916dab8a8f892730abc4.mockapi.io/Bike";

const DEFAULT_SHOP_NAME: &str = "Power Bike Shop";
const DEFAULT_TAGLINE: &str = "A premium online store for sportier and stylish choice";

/// Runtime settings for the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP endpoint returning the full catalog as a JSON array.
    pub api_url: String,
    /// Storefront name shown on the intro screen.
    pub shop_name: String,
    /// Tagline shown beneath the storefront name.
    pub tagline: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            shop_name: DEFAULT_SHOP_NAME.to_string(),
            tagline: DEFAULT_TAGLINE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path()?)
    }

    /// Load settings layered over the file at `path` (which may be
    /// absent) and `VELO_*` environment variables.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("shop_name", defaults.shop_name)?
            .set_default("tagline", defaults.tagline)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("VELO"))
            .build()
            .context("failed to assemble configuration")?;
        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

/// Location of the user config file.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine user config directory")?;
    Ok(base.join("velo").join("config.toml"))
}

/// Write a commented default config file on first run. Returns the
/// path; an existing file is left untouched.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path()?;
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let contents = format!(
        "# Velo storefront configuration.\n\
         # Environment variables with a VELO_ prefix override these values.\n\
         \n\
         api_url = \"{DEFAULT_API_URL}\"\n\
         shop_name = \"{DEFAULT_SHOP_NAME}\"\n\
         tagline = \"{DEFAULT_TAGLINE}\"\n"
    );
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let temp = tempdir()?;
        let config = AppConfig::load_from(temp.path().join("absent.toml"))?;
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.shop_name, DEFAULT_SHOP_NAME);
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");
        fs::write(&path, "api_url = \"http://localhost:8080/bikes\"\n")?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_url, "http://localhost:8080/bikes");
        assert_eq!(config.tagline, DEFAULT_TAGLINE);
        Ok(())
    }

    #[test]
    fn default_template_round_trips() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("velo").join("config.toml");
        write_default_config(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_url, DEFAULT_API_URL);

        // A second run must not clobber user edits.
        fs::write(&path, "shop_name = \"Edited\"\n")?;
        write_default_config(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.shop_name, "Edited");
        Ok(())
    }
}
