//! Wizard limits and defaults, persisted as JSON.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::DistanceUnit;
use crate::errors::ConfigError;

const CONFIG_FILE_NAME: &str = "wizard.json";
const TMP_SUFFIX: &str = "tmp";

/// Tunable limits applied by the wizard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default = "WizardConfig::default_max_images")]
    pub max_images: usize,
    #[serde(default = "WizardConfig::default_min_images")]
    pub min_images: usize,
    #[serde(default = "WizardConfig::default_max_bathrooms")]
    pub max_bathrooms: u8,
    #[serde(default = "WizardConfig::default_max_bedrooms")]
    pub max_bedrooms: u8,
    #[serde(default = "WizardConfig::default_min_description_len")]
    pub min_description_len: usize,
    #[serde(default)]
    pub default_distance_unit: DistanceUnit,
    /// When false the host cannot decode images and candidates are
    /// accepted on the format check alone.
    #[serde(default = "WizardConfig::default_probe_images")]
    pub probe_images: bool,
    /// Load persisted images as pending on edit so they are probed again.
    #[serde(default)]
    pub revalidate_images_on_edit: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_images: Self::default_max_images(),
            min_images: Self::default_min_images(),
            max_bathrooms: Self::default_max_bathrooms(),
            max_bedrooms: Self::default_max_bedrooms(),
            min_description_len: Self::default_min_description_len(),
            default_distance_unit: DistanceUnit::default(),
            probe_images: Self::default_probe_images(),
            revalidate_images_on_edit: false,
        }
    }
}

impl WizardConfig {
    pub fn default_max_images() -> usize {
        5
    }

    pub fn default_min_images() -> usize {
        3
    }

    pub fn default_max_bathrooms() -> u8 {
        20
    }

    pub fn default_max_bedrooms() -> u8 {
        20
    }

    pub fn default_min_description_len() -> usize {
        20
    }

    pub fn default_probe_images() -> bool {
        true
    }

    /// Rejects combinations the wizard cannot satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_images == 0 {
            return Err(ConfigError::Invalid("max_images must be at least 1".into()));
        }
        if self.min_images > self.max_images {
            return Err(ConfigError::Invalid(format!(
                "min_images ({}) exceeds max_images ({})",
                self.min_images, self.max_images
            )));
        }
        if self.max_bathrooms == 0 || self.max_bedrooms == 0 {
            return Err(ConfigError::Invalid(
                "room limits must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves [`WizardConfig`] on disk.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE_NAME)))
    }

    /// Platform config directory, e.g. `~/.config/listing_wizard`.
    pub fn default_location() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("listing_wizard")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<WizardConfig, ConfigError> {
        if !self.config_path.exists() {
            return Ok(WizardConfig::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        let config: WizardConfig =
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &WizardConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
