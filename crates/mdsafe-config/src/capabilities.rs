use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How relative links are resolved when HTML is converted back to Markdown.
///
/// In configuration files this is written as a plain value: `false` disables
/// resolution, `true` inherits the server URL and a string is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBaseUri", into = "RawBaseUri")]
pub enum BaseUri {
  /// Never resolve relative links.
  Disabled,
  /// Resolve against the hosting application's server URL.
  ServerUrl,
  /// Resolve against the given URI.
  Uri(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawBaseUri {
  Flag(bool),
  Uri(String),
}

impl From<RawBaseUri> for BaseUri {
  fn from(raw: RawBaseUri) -> Self {
    match raw {
      RawBaseUri::Flag(false) => Self::Disabled,
      RawBaseUri::Flag(true) => Self::ServerUrl,
      RawBaseUri::Uri(uri) => Self::Uri(uri),
    }
  }
}

impl From<BaseUri> for RawBaseUri {
  fn from(base_uri: BaseUri) -> Self {
    match base_uri {
      BaseUri::Disabled => Self::Flag(false),
      BaseUri::ServerUrl => Self::Flag(true),
      BaseUri::Uri(uri) => Self::Uri(uri),
    }
  }
}

impl BaseUri {
  /// Parse the textual form used by `KEY=VALUE` overrides.
  #[must_use]
  pub fn parse(value: &str) -> Self {
    match value {
      "false" => Self::Disabled,
      "true" => Self::ServerUrl,
      uri => Self::Uri(uri.to_string()),
    }
  }
}

/// The flat capability block of the configuration (`[markdown]`).
///
/// Every flag defaults to `false`. Keys that are not recognised are kept in
/// [`CapabilityConfig::unknown`] so callers can report them instead of
/// silently dropping them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Flat capability map, one flag per feature"
)]
pub struct CapabilityConfig {
  /// Enable every two-way capability.
  pub all: bool,

  /// Abbreviation definitions (`*[HTML]: Hyper Text Markup Language`).
  pub abbreviations: bool,

  /// Treat newlines inside paragraphs as hard breaks.
  pub hardwraps: bool,

  /// Definition list syntax.
  #[serde(alias = "definition_lists")]
  pub definition_lists: bool,

  /// Bare URL detection.
  #[serde(alias = "auto_links")]
  pub auto_links: bool,

  /// Curly quotes.
  #[serde(alias = "smart_quotes")]
  pub smart_quotes: bool,

  /// Dashes and ellipses.
  #[serde(alias = "smart_punctuation")]
  pub smart_punctuation: bool,

  /// Every smart typography feature.
  pub smart: bool,

  /// Fenced code blocks.
  #[serde(alias = "fenced_code_blocks")]
  pub fenced_code_blocks: bool,

  /// Drop raw HTML.
  #[serde(alias = "remove_html")]
  pub remove_html: bool,

  /// Table syntax.
  pub tables: bool,

  /// Drop tables when converting back, unless `tables` or `all` is set.
  #[serde(alias = "remove_tables")]
  pub remove_tables: bool,

  /// Base URI for resolving relative links.
  #[serde(alias = "base_uri", skip_serializing_if = "Option::is_none")]
  pub base_uri: Option<BaseUri>,

  /// Keys present in the source that no capability claims.
  #[serde(flatten, skip_serializing)]
  pub unknown: BTreeMap<String, serde_json::Value>,
}

impl CapabilityConfig {
  /// Names of the keys that were present in the source but are not
  /// capabilities.
  pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
    self.unknown.keys().map(String::as_str)
  }

  /// Set a single capability from its configuration key and textual value.
  /// Keys are accepted in camelCase and snake_case.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is not a capability or if a flag value is
  /// not `true` or `false`.
  pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    if matches!(key, "baseUri" | "base_uri") {
      self.base_uri = Some(BaseUri::parse(value));
      return Ok(());
    }

    let flag = match key {
      "all" => &mut self.all,
      "abbreviations" => &mut self.abbreviations,
      "hardwraps" => &mut self.hardwraps,
      "definitionLists" | "definition_lists" => &mut self.definition_lists,
      "autoLinks" | "auto_links" => &mut self.auto_links,
      "smartQuotes" | "smart_quotes" => &mut self.smart_quotes,
      "smartPunctuation" | "smart_punctuation" => &mut self.smart_punctuation,
      "smart" => &mut self.smart,
      "fencedCodeBlocks" | "fenced_code_blocks" => &mut self.fenced_code_blocks,
      "removeHtml" | "remove_html" => &mut self.remove_html,
      "tables" => &mut self.tables,
      "removeTables" | "remove_tables" => &mut self.remove_tables,
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown capability key: '{key}'"
        )));
      },
    };

    *flag = value.parse().map_err(|_| {
      ConfigError::Config(format!(
        "Invalid value for capability '{key}': '{value}'. Expected true or \
         false"
      ))
    })?;
    Ok(())
  }

  /// Merge another capability block into this one. Flags enabled in either
  /// block stay enabled, so a `false` in `other` never clears a flag; the
  /// other block's base URI wins when present.
  pub fn merge(&mut self, other: Self) {
    self.all |= other.all;
    self.abbreviations |= other.abbreviations;
    self.hardwraps |= other.hardwraps;
    self.definition_lists |= other.definition_lists;
    self.auto_links |= other.auto_links;
    self.smart_quotes |= other.smart_quotes;
    self.smart_punctuation |= other.smart_punctuation;
    self.smart |= other.smart;
    self.fenced_code_blocks |= other.fenced_code_blocks;
    self.remove_html |= other.remove_html;
    self.tables |= other.tables;
    self.remove_tables |= other.remove_tables;
    if other.base_uri.is_some() {
      self.base_uri = other.base_uri;
    }
    self.unknown.extend(other.unknown);
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_base_uri_from_toml_values() {
    let disabled: CapabilityConfig = toml::from_str("baseUri = false").unwrap();
    assert_eq!(disabled.base_uri, Some(BaseUri::Disabled));

    let inherit: CapabilityConfig = toml::from_str("baseUri = true").unwrap();
    assert_eq!(inherit.base_uri, Some(BaseUri::ServerUrl));

    let explicit: CapabilityConfig =
      toml::from_str(r#"baseUri = "http://example.com/docs""#).unwrap();
    assert_eq!(
      explicit.base_uri,
      Some(BaseUri::Uri("http://example.com/docs".to_string()))
    );
  }

  #[test]
  fn test_camel_case_keys() {
    let config: CapabilityConfig = serde_json::from_str(
      r#"{"definitionLists": true, "removeTables": true, "smart": true}"#,
    )
    .unwrap();
    assert!(config.definition_lists);
    assert!(config.remove_tables);
    assert!(config.smart);
    assert!(!config.tables);
    assert_eq!(config.unknown_keys().count(), 0);
  }

  #[test]
  fn test_snake_case_aliases() {
    let config: CapabilityConfig =
      toml::from_str("fenced_code_blocks = true
base_uri = false").unwrap();
    assert!(config.fenced_code_blocks);
    assert_eq!(config.base_uri, Some(BaseUri::Disabled));
    assert_eq!(config.unknown_keys().count(), 0);

    let mut config = CapabilityConfig::default();
    config.set("remove_html", "true").unwrap();
    assert!(config.remove_html);
  }

  #[test]
  fn test_unknown_keys_are_kept() {
    let config: CapabilityConfig =
      toml::from_str("tables = true\nfootnotes = true\nstrikethrough = 1")
        .unwrap();
    assert!(config.tables);
    let unknown: Vec<&str> = config.unknown_keys().collect();
    assert_eq!(unknown, vec!["footnotes", "strikethrough"]);
  }

  #[test]
  fn test_set_flags_and_base_uri() {
    let mut config = CapabilityConfig::default();
    config.set("fencedCodeBlocks", "true").unwrap();
    config.set("baseUri", "false").unwrap();
    assert!(config.fenced_code_blocks);
    assert_eq!(config.base_uri, Some(BaseUri::Disabled));

    assert!(config.set("tables", "yes").is_err());
    assert!(config.set("footnotes", "true").is_err());
  }

  #[test]
  fn test_merge_keeps_enabled_flags() {
    let mut base = CapabilityConfig {
      tables: true,
      base_uri: Some(BaseUri::Uri("http://a.example".to_string())),
      ..Default::default()
    };
    let other = CapabilityConfig {
      smart: true,
      ..Default::default()
    };
    base.merge(other);

    assert!(base.tables);
    assert!(base.smart);
    assert_eq!(
      base.base_uri,
      Some(BaseUri::Uri("http://a.example".to_string()))
    );
  }
}
