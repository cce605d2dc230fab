//! Markdown to HTML rendering.
//!
//! [`RenderEngine`] drives `comrak` with a set of [`RenderFlags`]. The engine
//! keeps per-call scratch state (the abbreviation table of the document being
//! rendered), so [`RenderEngine::render`] takes `&mut self` and a shared
//! instance has to be serialized by its owner.
mod abbreviations;

use std::borrow::Cow;

use bitflags::bitflags;
use comrak::{Arena, options::Options, parse_document};
use log::trace;

use self::abbreviations::Abbreviations;
use crate::error::{MarkdownError, Result};

bitflags! {
  /// Feature switches understood by the render engine.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct RenderFlags: u32 {
    /// `*[ABBR]: Expansion` definitions.
    const ABBREVIATIONS     = 1 << 0;
    /// Newlines inside paragraphs become `<br />`.
    const HARD_WRAP         = 1 << 1;
    /// `Term` / `: definition` blocks.
    const DEFINITION_LISTS  = 1 << 2;
    /// Bare URLs and email addresses become links.
    const AUTOLINK          = 1 << 3;
    const SMART_QUOTES      = 1 << 4;
    const SMART_PUNCTUATION = 1 << 5;
    const SMART             = 1 << 6;
    /// Fenced code blocks. CommonMark always parses fences; the bit is
    /// carried so the flag set mirrors the convert options.
    const FENCED_CODE       = 1 << 7;
    const TABLES            = 1 << 8;
    /// Raw HTML in the source is omitted from the output.
    const SKIP_HTML         = 1 << 9;
  }
}

impl RenderFlags {
  /// Every smart typography bit.
  pub const ANY_SMART: Self = Self::SMART_QUOTES
    .union(Self::SMART_PUNCTUATION)
    .union(Self::SMART);
}

/// Markdown to HTML engine.
#[derive(Debug)]
pub struct RenderEngine {
  flags:         RenderFlags,
  abbreviations: Abbreviations,
}

impl RenderEngine {
  /// Create an engine for the given flags.
  #[must_use]
  pub fn new(flags: RenderFlags) -> Self {
    Self {
      flags,
      abbreviations: Abbreviations::default(),
    }
  }

  /// Flags this engine was built with.
  #[must_use]
  pub const fn flags(&self) -> RenderFlags {
    self.flags
  }

  /// Render Markdown to an HTML fragment.
  ///
  /// # Errors
  ///
  /// Returns [`MarkdownError::Conversion`] if the HTML cannot be produced.
  pub fn render(&mut self, markdown: &str) -> Result<String> {
    self.abbreviations.clear();

    let source = if self.flags.contains(RenderFlags::ABBREVIATIONS) {
      self.abbreviations.extract(markdown)
    } else {
      Cow::Borrowed(markdown)
    };

    let options = comrak_options(self.flags);
    let arena = Arena::new();
    let root = parse_document(&arena, &source, &options);

    let mut html = String::with_capacity(source.len() * 2);
    comrak::format_html(root, &options, &mut html).map_err(|e| {
      MarkdownError::Conversion(format!("Failed to format HTML: {e}"))
    })?;

    if self.abbreviations.is_empty() {
      return Ok(html);
    }

    trace!(
      "Applying {} abbreviation definition(s)",
      self.abbreviations.len()
    );
    self.abbreviations.apply(&html)
  }
}

/// Build comrak options from render flags.
fn comrak_options(flags: RenderFlags) -> Options<'static> {
  let mut options = Options::default();

  options.render.hardbreaks = flags.contains(RenderFlags::HARD_WRAP);
  options.extension.description_lists =
    flags.contains(RenderFlags::DEFINITION_LISTS);
  options.extension.autolink = flags.contains(RenderFlags::AUTOLINK);
  options.parse.smart = flags.intersects(RenderFlags::ANY_SMART);
  options.extension.table = flags.contains(RenderFlags::TABLES);

  if flags.contains(RenderFlags::SKIP_HTML) {
    options.render.r#unsafe = false;
  } else {
    options.render.r#unsafe = true;
    options.extension.tagfilter = true;
  }

  options
}
