//! The public conversion service.
use std::sync::OnceLock;

use log::trace;
use mdsafe_config::Config;

use crate::{
  cache::ConverterCache,
  capabilities::Capabilities,
  error::Result,
};

/// Markdown rendering, conversion back to Markdown and sanitizing, sharing
/// one set of default capabilities.
///
/// Calls without a capability override use the default engines, built once
/// per service. Calls with an override build their own engines and leave the
/// defaults untouched.
#[derive(Debug)]
pub struct Markdown {
  cache: ConverterCache,
}

impl Markdown {
  /// Create a service from the hosting configuration.
  #[must_use]
  pub fn new(config: Config) -> Self {
    let capabilities = Capabilities::from(&config.markdown);
    Self::with_capabilities(capabilities, config.server_url)
  }

  /// Create a service from capabilities built in code.
  #[must_use]
  pub const fn with_capabilities(
    capabilities: Capabilities,
    server_url: Option<String>,
  ) -> Self {
    Self {
      cache: ConverterCache::new(capabilities, server_url),
    }
  }

  #[must_use]
  pub const fn cache(&self) -> &ConverterCache {
    &self.cache
  }

  /// Render Markdown to HTML.
  ///
  /// # Errors
  ///
  /// Returns an error if the render engine fails. Convert options play no
  /// part here, so an invalid convert customizer does not fail a render.
  pub fn render(
    &self,
    text: &str,
    config: Option<&Capabilities>,
  ) -> Result<String> {
    match config {
      None => self.cache.default_renderer().render(text),
      Some(capabilities) => {
        self.cache.ephemeral(capabilities).renderer().render(text)
      },
    }
  }

  /// Convert HTML back to Markdown.
  ///
  /// A non-empty `base_uri` takes precedence over the base URI of the
  /// capabilities in use.
  ///
  /// # Errors
  ///
  /// Returns an error if the convert engine cannot be built or rejects the
  /// input.
  pub fn convert_back(
    &self,
    html: &str,
    base_uri: Option<&str>,
    config: Option<&Capabilities>,
  ) -> Result<String> {
    match config {
      None => {
        let engine = self.cache.default_converter()?;
        let base_uri = effective_base_uri(base_uri, self.cache.default_base_uri());
        engine.convert(html, base_uri.as_deref())
      },
      Some(capabilities) => {
        let engines = self.cache.ephemeral(capabilities);
        let converter = engines.converter()?;
        let base_uri = effective_base_uri(base_uri, engines.base_uri());
        converter.convert(html, base_uri.as_deref())
      },
    }
  }

  /// Render `text` and convert the result back to Markdown with the same
  /// capabilities, dropping whatever does not survive the round trip.
  ///
  /// # Errors
  ///
  /// Returns the first error of either step.
  pub fn sanitize(
    &self,
    text: &str,
    config: Option<&Capabilities>,
  ) -> Result<String> {
    let html = self.render(text, config)?;
    self.convert_back(&html, None, config)
  }
}

impl Default for Markdown {
  fn default() -> Self {
    Self::new(Config::default())
  }
}

/// Pick the base URI for a conversion and make sure it ends with a slash so
/// that relative links resolve below it.
fn effective_base_uri(
  given: Option<&str>,
  default: Option<&str>,
) -> Option<String> {
  let chosen = given
    .filter(|uri| !uri.is_empty())
    .or_else(|| default.filter(|uri| !uri.is_empty()))?;
  trace!("Converting with base URI {chosen}");

  if chosen.ends_with('/') {
    Some(chosen.to_string())
  } else {
    Some(format!("{chosen}/"))
  }
}

static GLOBAL: OnceLock<Markdown> = OnceLock::new();

/// Install the process-wide service used by the free functions.
///
/// # Errors
///
/// Returns `markdown` back if a service was already installed or the default
/// one was already created by an earlier call.
pub fn install(markdown: Markdown) -> std::result::Result<(), Markdown> {
  GLOBAL.set(markdown)
}

/// The process-wide service, created from the default configuration if none
/// was installed.
pub fn global() -> &'static Markdown {
  GLOBAL.get_or_init(Markdown::default)
}

/// Render Markdown to HTML with the process-wide service.
///
/// # Errors
///
/// See [`Markdown::render`].
pub fn render(text: &str, config: Option<&Capabilities>) -> Result<String> {
  global().render(text, config)
}

/// Convert HTML back to Markdown with the process-wide service.
///
/// # Errors
///
/// See [`Markdown::convert_back`].
pub fn convert_back(
  html: &str,
  base_uri: Option<&str>,
  config: Option<&Capabilities>,
) -> Result<String> {
  global().convert_back(html, base_uri, config)
}

/// Sanitize Markdown with the process-wide service.
///
/// # Errors
///
/// See [`Markdown::sanitize`].
pub fn sanitize(text: &str, config: Option<&Capabilities>) -> Result<String> {
  global().sanitize(text, config)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::capabilities::BaseUri;

  #[test]
  fn test_effective_base_uri() {
    assert_eq!(
      effective_base_uri(Some("http://a.example"), Some("http://b.example/")),
      Some("http://a.example/".to_string())
    );
    assert_eq!(
      effective_base_uri(Some(""), Some("http://b.example/")),
      Some("http://b.example/".to_string())
    );
    assert_eq!(
      effective_base_uri(None, Some("http://b.example")),
      Some("http://b.example/".to_string())
    );
    assert_eq!(effective_base_uri(None, Some("")), None);
    assert_eq!(effective_base_uri(None, None), None);
  }

  #[test]
  fn test_render_and_convert_back() {
    let markdown = Markdown::default();
    assert!(
      markdown
        .render("**bold**", None)
        .unwrap()
        .contains("<strong>bold</strong>")
    );
    assert_eq!(
      markdown
        .convert_back("<strong>bold</strong>", None, None)
        .unwrap(),
      "**bold**"
    );
  }

  #[test]
  fn test_override_wins_over_config_base_uri() {
    let markdown = Markdown::with_capabilities(
      Capabilities::builder()
        .base_uri(BaseUri::Uri("http://example.com/docs".to_string()))
        .build(),
      None,
    );
    let html = r#"<a href="x">y</a>"#;
    assert_eq!(
      markdown.convert_back(html, None, None).unwrap(),
      "[y](http://example.com/docs/x)"
    );
    assert_eq!(
      markdown
        .convert_back(html, Some("http://other.example"), None)
        .unwrap(),
      "[y](http://other.example/x)"
    );
  }

  #[test]
  fn test_custom_config_uses_its_own_base_uri() {
    let markdown = Markdown::with_capabilities(
      Capabilities::default(),
      Some("http://server.example".to_string()),
    );
    let disabled = Capabilities::builder().base_uri(BaseUri::Disabled).build();
    let html = r#"<a href="x">y</a>"#;

    assert_eq!(
      markdown.convert_back(html, None, None).unwrap(),
      "[y](http://server.example/x)"
    );
    assert_eq!(
      markdown.convert_back(html, None, Some(&disabled)).unwrap(),
      "[y](x)"
    );
  }
}
