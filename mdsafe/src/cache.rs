//! Lazily built default engines and one-off engines for custom capabilities.
use std::sync::OnceLock;

use log::{debug, trace};

use crate::{
  capabilities::Capabilities,
  convert::ConvertEngine,
  error::Result,
  guard::SharedRenderer,
  render::RenderEngine,
  resolver::{ResolvedConfig, resolve},
};

/// Settings for engines built for a single call with non-default
/// capabilities.
///
/// Each engine is built only when asked for and is owned by the caller, so
/// no locking is involved. An invalid convert configuration therefore only
/// fails the calls that convert.
#[derive(Debug)]
pub struct EphemeralEngines {
  resolved: ResolvedConfig,
}

impl EphemeralEngines {
  #[must_use]
  pub fn renderer(&self) -> RenderEngine {
    RenderEngine::new(self.resolved.render_flags)
  }

  /// Build the convert engine.
  ///
  /// # Errors
  ///
  /// Returns [`MarkdownError::Configuration`](crate::MarkdownError) if the
  /// resolved convert options are invalid.
  pub fn converter(&self) -> Result<ConvertEngine> {
    ConvertEngine::new(self.resolved.convert_options.clone())
  }

  #[must_use]
  pub fn base_uri(&self) -> Option<&str> {
    self.resolved.base_uri.as_deref()
  }
}

/// Owner of the default engine pair.
///
/// The default capabilities are resolved at most once and each engine is
/// built at most once, on first use. A failure to build the convert engine
/// is kept and returned to every later caller.
#[derive(Debug)]
pub struct ConverterCache {
  capabilities: Capabilities,
  server_url:   Option<String>,
  resolved:     OnceLock<ResolvedConfig>,
  renderer:     OnceLock<SharedRenderer>,
  converter:    OnceLock<Result<ConvertEngine>>,
}

impl ConverterCache {
  #[must_use]
  pub const fn new(capabilities: Capabilities, server_url: Option<String>) -> Self {
    Self {
      capabilities,
      server_url,
      resolved: OnceLock::new(),
      renderer: OnceLock::new(),
      converter: OnceLock::new(),
    }
  }

  /// The hosting application's server URL.
  #[must_use]
  pub fn server_url(&self) -> Option<&str> {
    self.server_url.as_deref()
  }

  /// Engine settings for the default capabilities.
  pub fn defaults(&self) -> &ResolvedConfig {
    self.resolved.get_or_init(|| {
      let resolved = resolve(&self.capabilities, self.server_url.as_deref());
      debug!(
        "Resolved default capabilities: render flags {:?}, base URI {:?}",
        resolved.render_flags, resolved.base_uri
      );
      resolved
    })
  }

  /// The shared default render engine.
  pub fn default_renderer(&self) -> &SharedRenderer {
    self.renderer.get_or_init(|| {
      let flags = self.defaults().render_flags;
      debug!("Building default render engine");
      SharedRenderer::new(RenderEngine::new(flags))
    })
  }

  /// The default convert engine.
  ///
  /// # Errors
  ///
  /// Returns [`MarkdownError::Configuration`](crate::MarkdownError) if the
  /// default convert options are invalid.
  pub fn default_converter(&self) -> Result<&ConvertEngine> {
    self
      .converter
      .get_or_init(|| {
        debug!("Building default convert engine");
        ConvertEngine::new(self.defaults().convert_options.clone())
      })
      .as_ref()
      .map_err(Clone::clone)
  }

  /// Base URI of the default capabilities.
  pub fn default_base_uri(&self) -> Option<&str> {
    self.defaults().base_uri.as_deref()
  }

  /// Resolve `capabilities` for throwaway engines. The defaults are not
  /// touched.
  #[must_use]
  pub fn ephemeral(&self, capabilities: &Capabilities) -> EphemeralEngines {
    let resolved = resolve(capabilities, self.server_url.as_deref());
    trace!(
      "Resolved ephemeral capabilities: render flags {:?}",
      resolved.render_flags
    );
    EphemeralEngines { resolved }
  }
}
