//! Abbreviation definitions (`*[HTML]: Hyper Text Markup Language`).
//!
//! comrak has no abbreviation extension, so definitions are cut out of the
//! source before parsing and their occurrences are wrapped in `<abbr>` on the
//! rendered DOM.
use std::{borrow::Cow, sync::LazyLock};

use kuchikikiki::NodeRef;
use markup5ever::local_name;
use regex::Regex;
use tendril::TendrilSink;

use crate::{
  error::{MarkdownError, Result},
  utils,
};

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^ {0,3}\*\[([^\]\n]+)\]:[ \t]*(.*?)[ \t]*$")
    .unwrap_or_else(|e| {
      log::error!("Failed to compile DEFINITION_RE regex: {e}");
      utils::never_matching_regex()
    })
});

/// Elements whose text is never scanned for abbreviations.
const SKIPPED_ANCESTORS: &[&str] = &["a", "abbr", "code", "pre", "script", "style"];

/// Abbreviation table of the document currently being rendered.
#[derive(Debug, Default)]
pub(super) struct Abbreviations {
  definitions: Vec<(String, String)>,
}

impl Abbreviations {
  pub(super) fn clear(&mut self) {
    self.definitions.clear();
  }

  pub(super) fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  pub(super) fn len(&self) -> usize {
    self.definitions.len()
  }

  /// Collect the definitions of `markdown` and return the source without the
  /// definition lines. A later definition of the same abbreviation wins.
  /// Lines inside fenced code blocks are left alone.
  pub(super) fn extract<'a>(&mut self, markdown: &'a str) -> Cow<'a, str> {
    let mut kept = String::with_capacity(markdown.len());
    let mut open_fence: Option<(char, usize)> = None;
    let mut found = false;

    for line in markdown.split_inclusive('\n') {
      let content = line.trim_end_matches(['\r', '\n']);

      if let Some((fence_char, run, has_info)) = fence(content) {
        match open_fence {
          None => open_fence = Some((fence_char, run)),
          Some((open_char, open_run))
            if fence_char == open_char && run >= open_run && !has_info =>
          {
            open_fence = None;
          },
          Some(_) => {},
        }
        kept.push_str(line);
        continue;
      }

      let definition = open_fence
        .is_none()
        .then(|| DEFINITION_RE.captures(content))
        .flatten();
      let Some(caps) = definition else {
        kept.push_str(line);
        continue;
      };

      found = true;
      let abbr = caps[1].trim().to_string();
      if abbr.is_empty() {
        continue;
      }
      let expansion = caps[2].to_string();
      self.definitions.retain(|(existing, _)| *existing != abbr);
      self.definitions.push((abbr, expansion));
    }

    if !found {
      return Cow::Borrowed(markdown);
    }

    // Longest first so that "HTML5" is preferred over "HTML"
    self
      .definitions
      .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    Cow::Owned(kept)
  }

  fn expansion(&self, abbr: &str) -> Option<&str> {
    self
      .definitions
      .iter()
      .find(|(candidate, _)| candidate == abbr)
      .map(|(_, expansion)| expansion.as_str())
  }

  /// Wrap every known abbreviation in the rendered HTML in `<abbr>`.
  pub(super) fn apply(&self, html: &str) -> Result<String> {
    let alternatives = self
      .definitions
      .iter()
      .map(|(abbr, _)| bounded(abbr))
      .collect::<Vec<_>>()
      .join("|");
    let pattern = Regex::new(&format!("(?:{alternatives})")).map_err(
      |e| {
        MarkdownError::Conversion(format!(
          "Failed to build abbreviation pattern: {e}"
        ))
      },
    )?;

    let document = kuchikikiki::parse_html().one(html);
    let body = document.select_first("body").map_err(|()| {
      MarkdownError::Conversion("Rendered HTML has no body".to_string())
    })?;

    let text_nodes: Vec<NodeRef> = body
      .as_node()
      .descendants()
      .filter(|node| node.as_text().is_some() && !in_skipped_element(node))
      .collect();

    for node in text_nodes {
      self.wrap_matches(&node, &pattern);
    }

    let mut out = Vec::with_capacity(html.len());
    for child in body.as_node().children() {
      child.serialize(&mut out).map_err(|e| {
        MarkdownError::Conversion(format!("Failed to serialize HTML: {e}"))
      })?;
    }
    String::from_utf8(out).map_err(|e| {
      MarkdownError::Conversion(format!("Serialized HTML is not UTF-8: {e}"))
    })
  }

  fn wrap_matches(&self, node: &NodeRef, pattern: &Regex) {
    let Some(text) = node.as_text().map(|text| text.borrow().clone()) else {
      return;
    };
    if !pattern.is_match(&text) {
      return;
    }

    let mut last = 0;
    for found in pattern.find_iter(&text) {
      let Some(expansion) = self.expansion(found.as_str()) else {
        continue;
      };
      if found.start() > last {
        node.insert_before(NodeRef::new_text(&text[last..found.start()]));
      }
      let abbr = NodeRef::new_element(
        markup5ever::QualName::new(
          None,
          markup5ever::ns!(html),
          local_name!("abbr"),
        ),
        vec![(
          kuchikikiki::ExpandedName::new("", "title"),
          kuchikikiki::Attribute {
            prefix: None,
            value:  expansion.to_string(),
          },
        )],
      );
      abbr.append(NodeRef::new_text(found.as_str()));
      node.insert_before(abbr);
      last = found.end();
    }

    if last < text.len() {
      node.insert_before(NodeRef::new_text(&text[last..]));
    }
    node.detach();
  }
}

/// Fence character, run length and whether an info string follows, for a
/// line that opens or closes a fenced code block.
fn fence(line: &str) -> Option<(char, usize, bool)> {
  let rest = line.trim_start_matches(' ');
  if line.len() - rest.len() > 3 {
    return None;
  }
  let fence_char = rest.chars().next().filter(|c| matches!(c, '`' | '~'))?;
  let run = rest.len() - rest.trim_start_matches(fence_char).len();
  if run < 3 {
    return None;
  }
  let info = rest[run..].trim();
  if fence_char == '`' && info.contains('`') {
    return None;
  }
  Some((fence_char, run, !info.is_empty()))
}

fn is_word_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_'
}

/// Pattern for `abbr` that only matches where it is not glued to
/// surrounding word characters, including for abbreviations such as `C++`
/// that start or end with punctuation.
fn bounded(abbr: &str) -> String {
  let edge = |c: Option<char>| {
    if c.is_some_and(is_word_char) {
      r"\b"
    } else {
      r"\B"
    }
  };
  format!(
    "{}{}{}",
    edge(abbr.chars().next()),
    regex::escape(abbr),
    edge(abbr.chars().next_back())
  )
}

fn in_skipped_element(node: &NodeRef) -> bool {
  node.ancestors().any(|ancestor| {
    ancestor.as_element().is_some_and(|element| {
      SKIPPED_ANCESTORS.contains(&&*element.name.local)
    })
  })
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_extract_removes_definitions() {
    let mut abbreviations = Abbreviations::default();
    let source = abbreviations.extract(
      "Uses HTML and CSS.\n\n*[HTML]: Hyper Text Markup Language\n*[CSS]: \
       Cascading Style Sheets\n",
    );
    assert_eq!(source.trim_end(), "Uses HTML and CSS.");
    assert_eq!(abbreviations.len(), 2);
    assert_eq!(
      abbreviations.expansion("CSS"),
      Some("Cascading Style Sheets")
    );
  }

  #[test]
  fn test_extract_without_definitions_borrows() {
    let mut abbreviations = Abbreviations::default();
    let source = abbreviations.extract("plain text");
    assert!(matches!(source, Cow::Borrowed(_)));
    assert!(abbreviations.is_empty());
  }

  #[test]
  fn test_later_definition_wins() {
    let mut abbreviations = Abbreviations::default();
    abbreviations.extract("*[W3C]: first\n*[W3C]: World Wide Web Consortium\n");
    assert_eq!(abbreviations.len(), 1);
    assert_eq!(
      abbreviations.expansion("W3C"),
      Some("World Wide Web Consortium")
    );
  }

  #[test]
  fn test_apply_skips_code() {
    let mut abbreviations = Abbreviations::default();
    abbreviations.extract("*[API]: Application Programming Interface\n");
    let html = abbreviations
      .apply("<p>The API and <code>API</code></p>\n")
      .unwrap();
    assert_eq!(
      html,
      "<p>The <abbr title=\"Application Programming Interface\">API</abbr> \
       and <code>API</code></p>\n"
    );
  }

  #[test]
  fn test_apply_respects_word_boundaries() {
    let mut abbreviations = Abbreviations::default();
    abbreviations.extract("*[IO]: Input/Output\n");
    let html = abbreviations.apply("<p>IO and IOTA</p>").unwrap();
    assert!(html.contains("<abbr title=\"Input/Output\">IO</abbr> and IOTA"));
  }

  #[test]
  fn test_definitions_in_fenced_code_are_kept() {
    let mut abbreviations = Abbreviations::default();
    let markdown = "```\n*[API]: not a definition\n```\n\nThe API\n";
    let source = abbreviations.extract(markdown);
    assert_eq!(source, markdown);
    assert!(abbreviations.is_empty());

    let mut abbreviations = Abbreviations::default();
    let source = abbreviations
      .extract("~~~~\n*[A]: kept\n~~~\n~~~~\n*[B]: Bee\nB\n");
    assert_eq!(source, "~~~~\n*[A]: kept\n~~~\n~~~~\nB\n");
    assert_eq!(abbreviations.len(), 1);
    assert_eq!(abbreviations.expansion("B"), Some("Bee"));
  }

  #[test]
  fn test_apply_matches_punctuated_abbreviations() {
    let mut abbreviations = Abbreviations::default();
    abbreviations.extract("*[C++]: C plus plus\n*[.NET]: dotnet\n");
    let html = abbreviations
      .apply("<p>C++ on .NET, not C++x or a.NET</p>")
      .unwrap();
    assert_eq!(
      html,
      "<p><abbr title=\"C plus plus\">C++</abbr> on <abbr \
       title=\"dotnet\">.NET</abbr>, not C++x or a.NET</p>"
    );
  }
}
