use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{capabilities::CapabilityConfig, error::ConfigError};

/// Process-wide configuration for mdsafe.
///
/// [`Config`] is read once by the hosting application, typically from a TOML
/// or JSON file, and handed to `mdsafe` to build the default engines. The
/// `markdown` block is the default capability set; `server_url` is the
/// fallback base URI for link resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Public URL of the hosting application.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub server_url: Option<String>,

  /// Default capability set.
  pub markdown: CapabilityConfig,
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// Unknown keys in the `markdown` block are logged and ignored.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
      })?;

    let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content).map_err(|source| {
              ConfigError::Serde {
                path: path.to_path_buf(),
                source,
              }
            })?
          },
          "toml" => {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
              path: path.to_path_buf(),
              source,
            })?
          },
          _ => {
            return Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )));
          },
        }
      },
      None => {
        return Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )));
      },
    };

    for key in config.markdown.unknown_keys() {
      log::warn!(
        "Ignoring unknown capability '{key}' in {}",
        path.display()
      );
    }

    Ok(config)
  }

  /// Load and merge configuration files in order, then apply `KEY=VALUE`
  /// overrides. With no files the defaults are used.
  ///
  /// Capability flags only accumulate across files: a flag enabled by an
  /// earlier file stays enabled even if a later file sets it to `false`.
  /// Use an override (`markdown.tables=false`) to switch one off.
  ///
  /// # Errors
  ///
  /// Returns an error if any file fails to load or any override is invalid.
  pub fn load<P: AsRef<Path>>(
    config_files: &[P],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();
    for path in config_files {
      config.merge(Self::from_file(path)?);
    }

    if config_files.len() > 1 {
      log::info!("Loaded and merged {} config files", config_files.len());
    }

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Recognised keys are `server_url` and `markdown.<capability>`, where the
  /// capability uses its configuration-file spelling (`markdown.tables`,
  /// `markdown.baseUri`, ...).
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    if key == "server_url" {
      self.server_url = (!value.is_empty()).then(|| value.to_string());
      return Ok(());
    }

    match key.strip_prefix("markdown.") {
      Some(capability) => self.markdown.set(capability, value),
      None => {
        Err(ConfigError::Config(format!("Unknown config key: '{key}'")))
      },
    }
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - `server_url`: other's [`Some`] value replaces this config's value
  /// - `markdown`: see [`CapabilityConfig::merge`]
  pub fn merge(&mut self, other: Self) {
    if other.server_url.is_some() {
      self.server_url = other.server_url;
    }
    self.markdown.merge(other.markdown);
  }
}
