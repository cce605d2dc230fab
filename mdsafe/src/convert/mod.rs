//! HTML to Markdown conversion.
//!
//! [`ConvertEngine`] cleans HTML against an allowlist with `ammonia`, parses
//! the result with `kuchikikiki` and walks the DOM, emitting CommonMark
//! according to its [`ConvertOptions`]. The engine holds
//! no mutable state, so one instance can serve any number of threads.
mod clean;
mod escape;
mod options;
mod raw;
mod table;
mod writer;

use kuchikikiki::NodeRef;
use log::warn;
use tendril::TendrilSink;
use url::Url;

pub use self::options::{CodeBlockStyle, ConvertOptions, TableMode};
use self::writer::Writer;
use crate::error::{MarkdownError, Result};

/// Deepest element nesting the engine accepts.
pub const MAX_NESTING: usize = 256;

/// HTML to Markdown engine.
#[derive(Debug, Clone)]
pub struct ConvertEngine {
  options: ConvertOptions,
}

impl ConvertEngine {
  /// Create an engine, validating the options.
  ///
  /// # Errors
  ///
  /// Returns [`MarkdownError::Configuration`] if a marker character is not
  /// valid Markdown syntax.
  pub fn new(options: ConvertOptions) -> Result<Self> {
    options.validate()?;
    Ok(Self { options })
  }

  #[must_use]
  pub const fn options(&self) -> &ConvertOptions {
    &self.options
  }

  /// Convert an HTML fragment or document to Markdown.
  ///
  /// Relative links and image sources are resolved against `base_uri` when
  /// one is given and parses as an absolute URL. Script URLs, event handlers
  /// and elements outside the allowlist never reach the output.
  ///
  /// # Errors
  ///
  /// Returns [`MarkdownError::Conversion`] if the document nests elements
  /// deeper than [`MAX_NESTING`].
  pub fn convert(&self, html: &str, base_uri: Option<&str>) -> Result<String> {
    let base = base_uri
      .filter(|uri| !uri.is_empty())
      .and_then(|uri| {
        Url::parse(uri)
          .inspect_err(|e| {
            warn!("Ignoring base URI '{uri}': {e}");
          })
          .ok()
      });

    let document = kuchikikiki::parse_html().one(clean::clean(html));
    let body = document.select_first("body").map_err(|()| {
      MarkdownError::Conversion("Parsed HTML has no body".to_string())
    })?;
    let body = body.as_node();

    if exceeds_nesting(body, MAX_NESTING) {
      return Err(MarkdownError::Conversion(format!(
        "HTML nests elements deeper than {MAX_NESTING} levels"
      )));
    }

    let mut writer = Writer::new(&self.options, base.as_ref());
    let mut blocks = writer.blocks(body);
    blocks.extend(writer.definitions());
    Ok(blocks.join("\n\n"))
  }
}

/// Whether any element below `root` is nested more than `limit` levels deep.
fn exceeds_nesting(root: &NodeRef, limit: usize) -> bool {
  let mut stack = vec![(root.clone(), 0_usize)];
  while let Some((node, depth)) = stack.pop() {
    if depth > limit {
      return true;
    }
    stack.extend(
      node
        .children()
        .filter(|child| child.as_element().is_some())
        .map(|child| (child, depth + 1)),
    );
  }
  false
}
