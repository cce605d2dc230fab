//! Translation of a [`Capabilities`] value into settings for both engines.
//!
//! Every two-way capability sets its render flag and its convert option in
//! the same step, so a document rendered with one resolution and converted
//! back with the same resolution uses the same Markdown dialect both ways.
use crate::{
  capabilities::{BaseUri, Capabilities},
  convert::{CodeBlockStyle, ConvertOptions, TableMode},
  render::RenderFlags,
};

/// Engine settings derived from one capability set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
  pub render_flags:    RenderFlags,
  pub convert_options: ConvertOptions,
  /// Base URI for relative links when converting back, if any.
  pub base_uri:        Option<String>,
}

/// Resolve `capabilities` into engine settings.
///
/// `server_url` is the hosting application's URL. It is used as the base URI
/// unless the capabilities disable resolution or name a URI of their own.
#[must_use]
pub fn resolve(
  capabilities: &Capabilities,
  server_url: Option<&str>,
) -> ResolvedConfig {
  let mut render_flags = RenderFlags::empty();
  let mut convert_options = ConvertOptions::default();
  let enabled = |flag: bool| flag || capabilities.all;

  if enabled(capabilities.abbreviations) {
    render_flags |= RenderFlags::ABBREVIATIONS;
    convert_options.abbreviations = true;
  }
  if enabled(capabilities.hardwraps) {
    render_flags |= RenderFlags::HARD_WRAP;
    convert_options.hard_wraps = true;
  }
  if enabled(capabilities.definition_lists) {
    render_flags |= RenderFlags::DEFINITION_LISTS;
    convert_options.definition_lists = true;
  }
  if enabled(capabilities.auto_links) {
    render_flags |= RenderFlags::AUTOLINK;
    convert_options.auto_links = true;
  }
  if enabled(capabilities.smart_quotes) {
    render_flags |= RenderFlags::SMART_QUOTES;
    convert_options.smart_quotes = true;
  }
  if enabled(capabilities.smart_punctuation) {
    render_flags |= RenderFlags::SMART_PUNCTUATION;
    convert_options.smart_punctuation = true;
  }
  if enabled(capabilities.smart) {
    render_flags |= RenderFlags::SMART;
    convert_options.smart_quotes = true;
    convert_options.smart_punctuation = true;
  }
  if enabled(capabilities.fenced_code_blocks) {
    render_flags |= RenderFlags::FENCED_CODE;
    convert_options.code_block_style = CodeBlockStyle::Fenced;
    convert_options.code_fence = '~';
  }

  // Convert-side only
  if capabilities.remove_html {
    render_flags |= RenderFlags::SKIP_HTML;
    convert_options.strip_html = true;
  }
  if capabilities.remove_tables {
    convert_options.table_mode = TableMode::Remove;
  }

  // Tables win over remove_tables
  if enabled(capabilities.tables) {
    render_flags |= RenderFlags::TABLES;
    convert_options.table_mode = TableMode::MultiMarkdown;
  }

  if let Some(customize) = &capabilities.customize_convert_engine {
    convert_options = customize(convert_options);
  }
  if let Some(customize) = &capabilities.customize_render_engine {
    render_flags = customize(render_flags);
  }

  ResolvedConfig {
    render_flags,
    convert_options,
    base_uri: resolve_base_uri(capabilities.base_uri.as_ref(), server_url),
  }
}

fn resolve_base_uri(
  base_uri: Option<&BaseUri>,
  server_url: Option<&str>,
) -> Option<String> {
  match base_uri {
    Some(BaseUri::Disabled) => None,
    Some(BaseUri::Uri(uri)) if !uri.is_empty() => Some(uri.clone()),
    _ => {
      server_url
        .filter(|url| !url.is_empty())
        .map(str::to_string)
    },
  }
}
