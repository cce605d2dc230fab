//! The capability set shared by both conversion directions.
use std::{fmt, sync::Arc};

pub use mdsafe_config::BaseUri;
use mdsafe_config::CapabilityConfig;

use crate::{convert::ConvertOptions, render::RenderFlags};

/// Hook that adjusts the render flags after capabilities are applied.
pub type RenderCustomizer = Arc<dyn Fn(RenderFlags) -> RenderFlags + Send + Sync>;

/// Hook that adjusts the convert options after capabilities are applied.
pub type ConvertCustomizer =
  Arc<dyn Fn(ConvertOptions) -> ConvertOptions + Send + Sync>;

/// Feature switches applied to both the Markdown to HTML and the HTML to
/// Markdown engine.
///
/// Every flag defaults to `false`. `remove_html` and `remove_tables` only
/// affect what survives a conversion back to Markdown and are not turned on
/// by `all`.
#[derive(Clone, Default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "One flag per capability"
)]
pub struct Capabilities {
  pub all:                      bool,
  pub abbreviations:            bool,
  pub hardwraps:                bool,
  pub definition_lists:         bool,
  pub auto_links:               bool,
  pub smart_quotes:             bool,
  pub smart_punctuation:        bool,
  pub smart:                    bool,
  pub fenced_code_blocks:       bool,
  pub remove_html:              bool,
  pub tables:                   bool,
  pub remove_tables:            bool,
  pub base_uri:                 Option<BaseUri>,
  pub customize_render_engine:  Option<RenderCustomizer>,
  pub customize_convert_engine: Option<ConvertCustomizer>,
}

impl fmt::Debug for Capabilities {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Capabilities")
      .field("all", &self.all)
      .field("abbreviations", &self.abbreviations)
      .field("hardwraps", &self.hardwraps)
      .field("definition_lists", &self.definition_lists)
      .field("auto_links", &self.auto_links)
      .field("smart_quotes", &self.smart_quotes)
      .field("smart_punctuation", &self.smart_punctuation)
      .field("smart", &self.smart)
      .field("fenced_code_blocks", &self.fenced_code_blocks)
      .field("remove_html", &self.remove_html)
      .field("tables", &self.tables)
      .field("remove_tables", &self.remove_tables)
      .field("base_uri", &self.base_uri)
      .field(
        "customize_render_engine",
        &self.customize_render_engine.as_ref().map(|_| "<fn>"),
      )
      .field(
        "customize_convert_engine",
        &self.customize_convert_engine.as_ref().map(|_| "<fn>"),
      )
      .finish()
  }
}

impl Capabilities {
  #[must_use]
  pub fn builder() -> CapabilitiesBuilder {
    CapabilitiesBuilder::new()
  }
}

impl From<&CapabilityConfig> for Capabilities {
  fn from(config: &CapabilityConfig) -> Self {
    Self {
      all:                      config.all,
      abbreviations:            config.abbreviations,
      hardwraps:                config.hardwraps,
      definition_lists:         config.definition_lists,
      auto_links:               config.auto_links,
      smart_quotes:             config.smart_quotes,
      smart_punctuation:        config.smart_punctuation,
      smart:                    config.smart,
      fenced_code_blocks:       config.fenced_code_blocks,
      remove_html:              config.remove_html,
      tables:                   config.tables,
      remove_tables:            config.remove_tables,
      base_uri:                 config.base_uri.clone(),
      customize_render_engine:  None,
      customize_convert_engine: None,
    }
  }
}

/// Builder for constructing [`Capabilities`] with method chaining.
#[derive(Debug, Clone, Default)]
pub struct CapabilitiesBuilder {
  capabilities: Capabilities,
}

impl CapabilitiesBuilder {
  /// Create a builder with every capability disabled.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable every two-way capability.
  #[must_use]
  pub const fn all(mut self, enabled: bool) -> Self {
    self.capabilities.all = enabled;
    self
  }

  #[must_use]
  pub const fn abbreviations(mut self, enabled: bool) -> Self {
    self.capabilities.abbreviations = enabled;
    self
  }

  #[must_use]
  pub const fn hardwraps(mut self, enabled: bool) -> Self {
    self.capabilities.hardwraps = enabled;
    self
  }

  #[must_use]
  pub const fn definition_lists(mut self, enabled: bool) -> Self {
    self.capabilities.definition_lists = enabled;
    self
  }

  #[must_use]
  pub const fn auto_links(mut self, enabled: bool) -> Self {
    self.capabilities.auto_links = enabled;
    self
  }

  #[must_use]
  pub const fn smart_quotes(mut self, enabled: bool) -> Self {
    self.capabilities.smart_quotes = enabled;
    self
  }

  #[must_use]
  pub const fn smart_punctuation(mut self, enabled: bool) -> Self {
    self.capabilities.smart_punctuation = enabled;
    self
  }

  /// Enable smart quotes and smart punctuation together.
  #[must_use]
  pub const fn smart(mut self, enabled: bool) -> Self {
    self.capabilities.smart = enabled;
    self
  }

  #[must_use]
  pub const fn fenced_code_blocks(mut self, enabled: bool) -> Self {
    self.capabilities.fenced_code_blocks = enabled;
    self
  }

  /// Strip raw HTML: omitted when rendering, unwrapped when converting back.
  #[must_use]
  pub const fn remove_html(mut self, enabled: bool) -> Self {
    self.capabilities.remove_html = enabled;
    self
  }

  #[must_use]
  pub const fn tables(mut self, enabled: bool) -> Self {
    self.capabilities.tables = enabled;
    self
  }

  /// Drop tables when converting back, unless tables are enabled.
  #[must_use]
  pub const fn remove_tables(mut self, enabled: bool) -> Self {
    self.capabilities.remove_tables = enabled;
    self
  }

  /// Set how relative links are resolved when converting back.
  #[must_use]
  pub fn base_uri(mut self, base_uri: BaseUri) -> Self {
    self.capabilities.base_uri = Some(base_uri);
    self
  }

  /// Adjust the render flags after capabilities are applied.
  #[must_use]
  pub fn customize_render_engine<F>(mut self, customizer: F) -> Self
  where
    F: Fn(RenderFlags) -> RenderFlags + Send + Sync + 'static,
  {
    self.capabilities.customize_render_engine = Some(Arc::new(customizer));
    self
  }

  /// Adjust the convert options after capabilities are applied.
  #[must_use]
  pub fn customize_convert_engine<F>(mut self, customizer: F) -> Self
  where
    F: Fn(ConvertOptions) -> ConvertOptions + Send + Sync + 'static,
  {
    self.capabilities.customize_convert_engine = Some(Arc::new(customizer));
    self
  }

  #[must_use]
  pub fn build(self) -> Capabilities {
    self.capabilities
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder_sets_fields() {
    let capabilities = Capabilities::builder()
      .tables(true)
      .remove_html(true)
      .base_uri(BaseUri::Disabled)
      .build();
    assert!(capabilities.tables);
    assert!(capabilities.remove_html);
    assert!(!capabilities.all);
    assert_eq!(capabilities.base_uri, Some(BaseUri::Disabled));
  }

  #[test]
  fn test_from_capability_config() {
    let config = CapabilityConfig {
      smart: true,
      remove_tables: true,
      base_uri: Some(BaseUri::ServerUrl),
      ..Default::default()
    };
    let capabilities = Capabilities::from(&config);
    assert!(capabilities.smart);
    assert!(capabilities.remove_tables);
    assert_eq!(capabilities.base_uri, Some(BaseUri::ServerUrl));
    assert!(capabilities.customize_render_engine.is_none());
  }

  #[test]
  fn test_debug_hides_closures() {
    let capabilities = Capabilities::builder()
      .customize_render_engine(|flags| flags)
      .build();
    let debug = format!("{capabilities:?}");
    assert!(debug.contains("customize_render_engine: Some(\"<fn>\")"));
    assert!(debug.contains("customize_convert_engine: None"));
  }
}
