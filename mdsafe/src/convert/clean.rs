//! Allowlist cleaning of the HTML handed to the converter.
//!
//! Input goes through `ammonia` before the DOM walk, so anything the writer
//! keeps as raw HTML has already passed the tag, attribute and URL scheme
//! allowlists.
use std::collections::HashSet;

use ammonia::Builder;

/// Elements that are dropped together with their content.
const DROPPED_ELEMENTS: &[&str] = &[
  "applet", "base", "embed", "frame", "frameset", "head", "iframe", "link",
  "math", "meta", "noembed", "noframes", "noscript", "object", "plaintext",
  "script", "style", "svg", "template", "textarea", "title", "xmp",
];

/// Elements the writer understands on top of ammonia's default set.
const EXTRA_TAGS: &[&str] =
  &["address", "kbd", "main", "samp", "section", "tfoot", "tt"];

fn builder() -> Builder<'static> {
  let mut builder = Builder::default();
  builder
    .add_tags(EXTRA_TAGS)
    .clean_content_tags(DROPPED_ELEMENTS.iter().copied().collect::<HashSet<_>>())
    .add_generic_attributes(&["class"])
    .add_tag_attributes("ol", &["start"])
    .add_tag_attributes("th", &["align"])
    .add_tag_attributes("td", &["align"])
    .link_rel(None);
  builder
}

/// `html` with everything outside the allowlist removed.
pub(super) fn clean(html: &str) -> String {
  builder().clean(html).to_string()
}
