//! DOM walker that writes Markdown.
use std::collections::BTreeMap;

use kuchikikiki::{ElementData, NodeRef};
use url::Url;

use super::{
  escape::{
    code_span,
    collapse_whitespace,
    escape_closing_hashes,
    escape_line_start,
    escape_text,
    fold_typography,
    longest_run,
  },
  options::{CodeBlockStyle, ConvertOptions},
  raw,
};

/// Elements that start a new Markdown block.
const BLOCK_ELEMENTS: &[&str] = &[
  "address",
  "article",
  "aside",
  "blockquote",
  "body",
  "caption",
  "center",
  "dd",
  "details",
  "div",
  "dl",
  "dt",
  "fieldset",
  "figcaption",
  "figure",
  "footer",
  "form",
  "h1",
  "h2",
  "h3",
  "h4",
  "h5",
  "h6",
  "header",
  "hr",
  "html",
  "li",
  "main",
  "nav",
  "ol",
  "p",
  "pre",
  "section",
  "summary",
  "table",
  "tbody",
  "td",
  "tfoot",
  "th",
  "thead",
  "tr",
  "ul",
];

/// Largest ordered list number CommonMark accepts (nine digits).
const MAX_LIST_NUMBER: u64 = 999_999_999;

pub(super) fn attr(element: &ElementData, name: &str) -> Option<String> {
  element.attributes.borrow().get(name).map(str::to_string)
}

fn is_block(name: &str) -> bool {
  BLOCK_ELEMENTS.contains(&name)
}

/// Turn the collected inline text of a paragraph into a block.
fn flush_paragraph(paragraph: &mut String, blocks: &mut Vec<String>) {
  let text = std::mem::take(paragraph);
  let lines: Vec<String> = text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(|line| escape_line_start(line).into_owned())
    .collect();
  if !lines.is_empty() {
    blocks.push(lines.join("\n"));
  }
}

/// Prefix the first line of `content` with `marker` and indent the rest so
/// they stay inside the list item.
fn indent_item(marker: &str, content: &str) -> String {
  if content.is_empty() {
    return marker.to_string();
  }

  let indent = " ".repeat(marker.len() + 1);
  let mut out = String::with_capacity(content.len() + marker.len() + 1);
  for (i, line) in content.lines().enumerate() {
    if i == 0 {
      out.push_str(marker);
      out.push(' ');
    } else {
      out.push('\n');
      if !line.is_empty() {
        out.push_str(&indent);
      }
    }
    out.push_str(line);
  }
  out
}

/// Wrap inline `content` in `delimiter`, keeping surrounding whitespace
/// outside so the delimiter run stays flanking.
fn delimit(delimiter: &str, content: &str) -> String {
  let inner = content.trim();
  if inner.is_empty() {
    return content.to_string();
  }
  let lead = &content[..content.len() - content.trim_start().len()];
  let trail = &content[content.trim_end().len()..];
  format!("{lead}{delimiter}{inner}{delimiter}{trail}")
}

/// Link destination, wrapped in `<>` when it would not parse bare.
fn destination(url: &str) -> String {
  if url.is_empty() || url.contains([' ', '(', ')', '<', '>', '\n']) {
    let url = url.replace('<', "%3C").replace('>', "%3E").replace('\n', "");
    return format!("<{url}>");
  }
  url.to_string()
}

fn title_suffix(title: Option<&str>) -> String {
  match title {
    Some(title) if !title.is_empty() => {
      let title = collapse_whitespace(title)
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
      format!(" \"{title}\"")
    },
    _ => String::new(),
  }
}

/// Markdown writer for one document.
pub(super) struct Writer<'a> {
  pub(super) options:       &'a ConvertOptions,
  pub(super) base:          Option<&'a Url>,
  pub(super) abbreviations: BTreeMap<String, String>,
  pub(super) in_table:      bool,
}

impl<'a> Writer<'a> {
  pub(super) fn new(options: &'a ConvertOptions, base: Option<&'a Url>) -> Self {
    Self {
      options,
      base,
      abbreviations: BTreeMap::new(),
      in_table: false,
    }
  }

  /// Abbreviation definitions collected while writing.
  pub(super) fn definitions(&self) -> Option<String> {
    if self.abbreviations.is_empty() {
      return None;
    }
    Some(
      self
        .abbreviations
        .iter()
        .map(|(abbr, title)| format!("*[{abbr}]: {title}"))
        .collect::<Vec<_>>()
        .join("\n"),
    )
  }

  /// Markdown blocks for the children of `node`.
  pub(super) fn blocks(&mut self, node: &NodeRef) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut paragraph = String::new();

    for child in node.children() {
      let Some(element) = child.as_element() else {
        paragraph.push_str(&self.inline(&child));
        continue;
      };
      let name: &str = &element.name.local;
      if !is_block(name) {
        paragraph.push_str(&self.inline(&child));
        continue;
      }

      flush_paragraph(&mut paragraph, &mut blocks);
      self.block(&child, element, name, &mut blocks);
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
  }

  fn block(
    &mut self,
    node: &NodeRef,
    element: &ElementData,
    name: &str,
    blocks: &mut Vec<String>,
  ) {
    match name {
      "p" => {
        let mut paragraph = self.inline_children(node);
        flush_paragraph(&mut paragraph, blocks);
      },
      "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
        let level = name[1..].parse::<usize>().unwrap_or(1);
        let text = self.single_line(node);
        if !text.is_empty() {
          blocks.push(format!(
            "{} {}",
            "#".repeat(level),
            escape_closing_hashes(&text)
          ));
        }
      },
      "blockquote" => {
        let inner = self.blocks(node).join("\n\n");
        if inner.is_empty() {
          return;
        }
        let quoted = inner
          .lines()
          .map(|line| {
            if line.is_empty() {
              ">".to_string()
            } else {
              format!("> {line}")
            }
          })
          .collect::<Vec<_>>()
          .join("\n");
        blocks.push(quoted);
      },
      "ul" => blocks.extend(self.list(node, element, false)),
      "ol" => blocks.extend(self.list(node, element, true)),
      "pre" => blocks.extend(self.code_block(node)),
      "hr" => blocks.push("* * *".to_string()),
      "dl" => blocks.extend(self.definition_list(node)),
      "table" => blocks.extend(self.table(node, element)),
      _ => blocks.extend(self.blocks(node)),
    }
  }

  /// Inline content of `node` flattened onto one line.
  pub(super) fn single_line(&mut self, node: &NodeRef) -> String {
    self
      .inline_children(node)
      .replace("\\\n", " ")
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn list(
    &mut self,
    node: &NodeRef,
    element: &ElementData,
    ordered: bool,
  ) -> Option<String> {
    let start = attr(element, "start")
      .and_then(|start| start.trim().parse::<u64>().ok())
      .map_or(1, |start| start.min(MAX_LIST_NUMBER));

    let items: Vec<NodeRef> = node
      .children()
      .filter(|child| child.as_element().is_some())
      .collect();
    if items.is_empty() {
      return None;
    }

    // A list is loose when any item holds its content in paragraphs
    let loose = items.iter().any(|item| {
      item.children().any(|child| {
        child
          .as_element()
          .is_some_and(|element| &*element.name.local == "p")
      })
    });

    let bullet = self.options.bullet_marker.to_string();
    let mut rendered = Vec::with_capacity(items.len());
    let mut number = start;
    for item in &items {
      let separator = if loose { "\n\n" } else { "\n" };
      let content = self.blocks(item).join(separator);
      let marker = if ordered {
        let marker = format!("{number}.");
        number = number.saturating_add(1).min(MAX_LIST_NUMBER);
        marker
      } else {
        bullet.clone()
      };
      rendered.push(indent_item(&marker, &content));
    }

    Some(rendered.join(if loose { "\n\n" } else { "\n" }))
  }

  fn code_block(&self, node: &NodeRef) -> Option<String> {
    let text = node.text_contents();
    let code = text.strip_suffix('\n').unwrap_or(&text);

    match self.options.code_block_style {
      CodeBlockStyle::Indented => {
        if code.trim().is_empty() {
          return None;
        }
        Some(
          code
            .lines()
            .map(|line| {
              if line.trim().is_empty() {
                String::new()
              } else {
                format!("    {line}")
              }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        )
      },
      CodeBlockStyle::Fenced => {
        let fence_char = self.options.code_fence;
        let fence = fence_char
          .to_string()
          .repeat(longest_run(code, fence_char).max(2) + 1);
        let language = code_language(node).unwrap_or_default();
        if code.is_empty() {
          Some(format!("{fence}{language}\n{fence}"))
        } else {
          Some(format!("{fence}{language}\n{code}\n{fence}"))
        }
      },
    }
  }

  fn definition_list(&mut self, node: &NodeRef) -> Vec<String> {
    if !self.options.definition_lists && !self.options.strip_html {
      let mut html = String::new();
      raw::write_raw(node, &mut html);
      return vec![html];
    }

    let mut parts = Vec::new();
    for child in node.children() {
      let Some(child_element) = child.as_element() else {
        continue;
      };
      match &*child_element.name.local {
        "dt" => {
          let term = self.single_line(&child);
          if !term.is_empty() {
            parts.push(escape_line_start(&term).into_owned());
          }
        },
        "dd" if self.options.definition_lists => {
          let definition = self.blocks(&child).join("\n\n");
          parts.push(indent_item(":", &definition));
        },
        _ => parts.extend(self.blocks(&child)),
      }
    }
    parts
  }

  /// Markdown for the children of `node` as one inline run.
  pub(super) fn inline_children(&mut self, node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
      out.push_str(&self.inline(&child));
    }
    out
  }

  fn inline(&mut self, node: &NodeRef) -> String {
    if let Some(text) = node.as_text() {
      let text = text.borrow();
      let text = collapse_whitespace(&text);
      let text = fold_typography(
        &text,
        self.options.smart_quotes,
        self.options.smart_punctuation,
      );
      return escape_text(&text, self.in_table);
    }

    let Some(element) = node.as_element() else {
      return String::new();
    };
    let name: &str = &element.name.local;

    match name {
      "strong" | "b" => delimit("**", &self.inline_children(node)),
      "em" | "i" => {
        let marker = self.options.emphasis_marker.to_string();
        delimit(&marker, &self.inline_children(node))
      },
      "code" | "kbd" | "samp" | "tt" => {
        let code = node.text_contents();
        if code.is_empty() {
          String::new()
        } else {
          code_span(&code)
        }
      },
      "a" => self.link(node, element),
      "img" => self.image(element),
      "br" => self.line_break(),
      "abbr" if self.options.abbreviations => self.abbreviation(node, element),
      _ if is_block(name) => {
        let text = self.single_line(node);
        format!(" {text} ")
      },
      _ => self.unknown_inline(node, element),
    }
  }

  fn line_break(&self) -> String {
    if self.options.hard_wraps {
      "\n".to_string()
    } else {
      "\\\n".to_string()
    }
  }

  fn link(&mut self, node: &NodeRef, element: &ElementData) -> String {
    let text = self.inline_children(node);
    let Some(href) = attr(element, "href") else {
      return text;
    };

    let title = attr(element, "title");
    if self.options.auto_links && title.is_none() {
      let label = node.text_contents();
      let label = label.trim();
      let absolute = Url::parse(&href).is_ok()
        && !href.contains([' ', '<', '>', '\n']);
      if absolute && label == href {
        return format!("<{href}>");
      }
      if absolute && href.strip_prefix("mailto:") == Some(label) {
        return format!("<{label}>");
      }
    }

    format!(
      "[{text}]({}{})",
      destination(&self.resolve(&href)),
      title_suffix(title.as_deref())
    )
  }

  fn image(&self, element: &ElementData) -> String {
    let alt = attr(element, "alt").unwrap_or_default();
    let alt = escape_text(&collapse_whitespace(&alt), self.in_table);
    let Some(src) = attr(element, "src") else {
      return alt;
    };

    format!(
      "![{alt}]({}{})",
      destination(&self.resolve(&src)),
      title_suffix(attr(element, "title").as_deref())
    )
  }

  /// Resolve a relative reference against the base URI. Absolute URLs and
  /// fragment links are returned unchanged.
  fn resolve(&self, href: &str) -> String {
    let Some(base) = self.base else {
      return href.to_string();
    };
    if href.starts_with('#') {
      return href.to_string();
    }

    match Url::parse(href) {
      Err(url::ParseError::RelativeUrlWithoutBase) => {
        base
          .join(href)
          .map_or_else(|_| href.to_string(), String::from)
      },
      _ => href.to_string(),
    }
  }

  fn abbreviation(&mut self, node: &NodeRef, element: &ElementData) -> String {
    let text = self.inline_children(node);
    let abbr = collapse_whitespace(node.text_contents().trim()).into_owned();
    if let Some(title) = attr(element, "title") {
      let title = collapse_whitespace(title.trim()).into_owned();
      if !abbr.is_empty() && !title.is_empty() {
        self.abbreviations.insert(abbr, title);
      }
    }
    text
  }

  /// Elements without a Markdown form: kept as sanitized raw HTML, or
  /// reduced to their content when HTML is stripped.
  fn unknown_inline(&mut self, node: &NodeRef, element: &ElementData) -> String {
    if self.options.strip_html {
      return self.inline_children(node);
    }

    let name: &str = &element.name.local;
    let open = raw::open_tag(element);
    if raw::is_void(name) {
      return open;
    }
    let content = self.inline_children(node);
    format!("{open}{content}{}", raw::close_tag(element))
  }
}

/// Language of a code block from a `language-*` or `lang-*` class on the
/// `<pre>` or its `<code>` child.
fn code_language(pre: &NodeRef) -> Option<String> {
  let mut candidates = vec![pre.clone()];
  candidates.extend(pre.children().filter(|child| {
    child
      .as_element()
      .is_some_and(|element| &*element.name.local == "code")
  }));

  candidates.iter().rev().find_map(|node| {
    let element = node.as_element()?;
    let class = attr(element, "class")?;
    class.split_whitespace().find_map(|class| {
      class
        .strip_prefix("language-")
        .or_else(|| class.strip_prefix("lang-"))
        .filter(|language| !language.is_empty())
        .map(str::to_string)
    })
  })
}
