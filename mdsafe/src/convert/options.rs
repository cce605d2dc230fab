//! Options for the HTML to Markdown engine.
use crate::error::{MarkdownError, Result};

/// How `<table>` elements are converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
  /// Keep the table as raw HTML.
  Preserve,
  /// Emit a pipe table (`| a | b |`).
  MultiMarkdown,
  /// Drop the table and its content.
  Remove,
}

/// How `<pre>` blocks are converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeBlockStyle {
  /// Four-space indented block. The language is lost.
  Indented,
  /// Fenced block using [`ConvertOptions::code_fence`].
  Fenced,
}

/// Settings of a [`ConvertEngine`](super::ConvertEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct ConvertOptions {
  /// Turn `<abbr title>` into `*[ABBR]: title` definitions.
  pub abbreviations: bool,

  /// Emit `<br>` as a bare newline instead of a backslash break.
  pub hard_wraps: bool,

  /// Emit `<dl>` as `Term` / `: definition` blocks.
  pub definition_lists: bool,

  /// Emit links whose text is their URL as `<url>`.
  pub auto_links: bool,

  /// Fold curly quotes back to ASCII quotes.
  pub smart_quotes: bool,

  /// Fold dashes and ellipses back to `--`, `---` and `...`.
  pub smart_punctuation: bool,

  /// Unwrap HTML elements that have no Markdown form instead of keeping them.
  pub strip_html: bool,

  pub table_mode: TableMode,

  pub code_block_style: CodeBlockStyle,

  /// Fence character for fenced code blocks: `` ` `` or `~`.
  pub code_fence: char,

  /// Bullet for unordered lists: `-`, `*` or `+`.
  pub bullet_marker: char,

  /// Emphasis delimiter: `*` or `_`.
  pub emphasis_marker: char,
}

impl Default for ConvertOptions {
  fn default() -> Self {
    Self {
      abbreviations:     false,
      hard_wraps:        false,
      definition_lists:  false,
      auto_links:        false,
      smart_quotes:      false,
      smart_punctuation: false,
      strip_html:        false,
      table_mode:        TableMode::Preserve,
      code_block_style:  CodeBlockStyle::Indented,
      code_fence:        '`',
      bullet_marker:     '-',
      emphasis_marker:   '*',
    }
  }
}

impl ConvertOptions {
  /// Check that every marker character is one Markdown understands.
  ///
  /// # Errors
  ///
  /// Returns [`MarkdownError::Configuration`] naming the first invalid option.
  pub fn validate(&self) -> Result<()> {
    check_marker("code_fence", self.code_fence, &['`', '~'])?;
    check_marker("bullet_marker", self.bullet_marker, &['-', '*', '+'])?;
    check_marker("emphasis_marker", self.emphasis_marker, &['*', '_'])
  }
}

fn check_marker(
  option: &'static str,
  value: char,
  allowed: &[char],
) -> Result<()> {
  if allowed.contains(&value) {
    return Ok(());
  }

  let expected = allowed
    .iter()
    .map(|c| format!("'{c}'"))
    .collect::<Vec<_>>()
    .join(", ");
  Err(MarkdownError::Configuration {
    option,
    reason: format!("'{value}' is not one of {expected}"),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_options_are_valid() {
    assert_eq!(ConvertOptions::default().validate(), Ok(()));
  }

  #[test]
  fn test_invalid_markers_are_rejected() {
    let options = ConvertOptions {
      bullet_marker: 'x',
      ..Default::default()
    };
    assert!(matches!(
      options.validate(),
      Err(MarkdownError::Configuration {
        option: "bullet_marker",
        ..
      })
    ));

    let options = ConvertOptions {
      code_fence: '"',
      ..Default::default()
    };
    assert!(options.validate().is_err());

    let options = ConvertOptions {
      emphasis_marker: '-',
      ..Default::default()
    };
    assert!(options.validate().is_err());
  }
}
