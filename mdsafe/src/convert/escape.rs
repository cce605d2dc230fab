//! Text escaping so that converted Markdown renders back to the same text.
use std::borrow::Cow;

/// Collapse every run of HTML whitespace into a single space.
pub(super) fn collapse_whitespace(text: &str) -> Cow<'_, str> {
  if !text.contains(['\t', '\n', '\r', '\x0c']) && !text.contains("  ") {
    return Cow::Borrowed(text);
  }

  let mut out = String::with_capacity(text.len());
  let mut in_space = false;
  for c in text.chars() {
    if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') {
      if !in_space {
        out.push(' ');
      }
      in_space = true;
    } else {
      out.push(c);
      in_space = false;
    }
  }
  Cow::Owned(out)
}

/// Replace typographic quotes and punctuation with their ASCII spelling.
pub(super) fn fold_typography(
  text: &str,
  quotes: bool,
  punctuation: bool,
) -> Cow<'_, str> {
  let folds = |c: char| {
    (quotes && matches!(c, '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}'))
      || (punctuation && matches!(c, '\u{2013}' | '\u{2014}' | '\u{2026}'))
  };
  if !text.chars().any(folds) {
    return Cow::Borrowed(text);
  }

  let mut out = String::with_capacity(text.len() + 8);
  for c in text.chars() {
    match c {
      '\u{2018}' | '\u{2019}' if quotes => out.push('\''),
      '\u{201c}' | '\u{201d}' if quotes => out.push('"'),
      '\u{2013}' if punctuation => out.push_str("--"),
      '\u{2014}' if punctuation => out.push_str("---"),
      '\u{2026}' if punctuation => out.push_str("..."),
      _ => out.push(c),
    }
  }
  Cow::Owned(out)
}

/// Backslash-escape characters that would otherwise start inline syntax.
pub(super) fn escape_text(text: &str, in_table: bool) -> String {
  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' => {
        out.push('\\');
        out.push(c);
      },
      '|' if in_table => out.push_str("\\|"),
      // Only escape ampersands that could start an entity reference
      '&'
        if chars
          .peek()
          .is_some_and(|next| next.is_ascii_alphanumeric() || *next == '#') =>
      {
        out.push_str("\\&");
      },
      _ => out.push(c),
    }
  }
  out
}

/// Escape a paragraph line whose start would be read as block syntax.
pub(super) fn escape_line_start(line: &str) -> Cow<'_, str> {
  let bytes = line.as_bytes();
  let Some(&first) = bytes.first() else {
    return Cow::Borrowed(line);
  };
  let followed_by_space =
    |at: usize| bytes.get(at).is_none_or(|b| *b == b' ' || *b == b'\t');

  let needs_escape = match first {
    b'#' => true,
    b'-' | b'+' => followed_by_space(1) || line.bytes().all(|b| b == first),
    b'=' => line.bytes().all(|b| b == b'=' || b == b' '),
    b':' => followed_by_space(1),
    b'~' => line.starts_with("~~~"),
    b'0'..=b'9' => {
      let digits = line.bytes().take_while(u8::is_ascii_digit).count();
      if digits <= 9
        && matches!(bytes.get(digits), Some(b'.' | b')'))
        && followed_by_space(digits + 1)
      {
        // Escape the delimiter, not the number
        let (number, rest) = line.split_at(digits);
        return Cow::Owned(format!("{number}\\{rest}"));
      }
      false
    },
    _ => false,
  };

  if needs_escape {
    Cow::Owned(format!("\\{line}"))
  } else {
    Cow::Borrowed(line)
  }
}

/// Escape a trailing run of `#` that an ATX heading would read as its
/// closing sequence.
pub(super) fn escape_closing_hashes(heading: &str) -> Cow<'_, str> {
  let body = heading.trim_end_matches('#');
  if body.len() == heading.len()
    || !(body.is_empty() || body.ends_with([' ', '\t']))
  {
    return Cow::Borrowed(heading);
  }
  Cow::Owned(format!("{body}\\{}", &heading[body.len()..]))
}

/// Wrap `code` in a backtick code span long enough to contain it.
pub(super) fn code_span(code: &str) -> String {
  let code = code.replace(['\n', '\r'], " ");
  let fence = "`".repeat(longest_run(&code, '`') + 1);
  let pad = code.starts_with('`')
    || code.ends_with('`')
    || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
  if pad {
    format!("{fence} {code} {fence}")
  } else {
    format!("{fence}{code}{fence}")
  }
}

/// Length of the longest run of `needle` in `text`.
pub(super) fn longest_run(text: &str, needle: char) -> usize {
  let mut longest = 0;
  let mut current = 0;
  for c in text.chars() {
    if c == needle {
      current += 1;
      longest = longest.max(current);
    } else {
      current = 0;
    }
  }
  longest
}
