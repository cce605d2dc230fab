//! Serialization of HTML that is kept as raw HTML in the Markdown output.
//!
//! The DOM has already been through [`super::clean`], so elements and
//! attributes are re-emitted as they are.
use kuchikikiki::{ElementData, NodeRef};

use super::escape::collapse_whitespace;

const VOID_ELEMENTS: &[&str] = &[
  "area", "br", "col", "hr", "img", "input", "source", "track", "wbr",
];

pub(super) fn is_void(name: &str) -> bool {
  VOID_ELEMENTS.contains(&name)
}

pub(super) fn open_tag(element: &ElementData) -> String {
  let name: &str = &element.name.local;
  let mut tag = format!("<{name}");
  let attributes = element.attributes.borrow();
  for (attr_name, attr) in &attributes.map {
    let attr_name: &str = &attr_name.local;
    tag.push(' ');
    tag.push_str(attr_name);
    tag.push_str("=\"");
    tag.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
    tag.push('"');
  }
  tag.push('>');
  tag
}

pub(super) fn close_tag(element: &ElementData) -> String {
  let name: &str = &element.name.local;
  format!("</{name}>")
}

/// Write `node` and its subtree as single-line HTML.
pub(super) fn write_raw(node: &NodeRef, out: &mut String) {
  if let Some(text) = node.as_text() {
    let text = text.borrow();
    out.push_str(&html_escape::encode_text(&collapse_whitespace(&text)));
    return;
  }

  let Some(element) = node.as_element() else {
    // Comments, doctypes and processing instructions are not kept
    return;
  };
  let name: &str = &element.name.local;
  out.push_str(&open_tag(element));
  if is_void(name) {
    return;
  }
  for child in node.children() {
    write_raw(&child, out);
  }
  out.push_str(&close_tag(element));
}
