//! Table conversion.
use kuchikikiki::{ElementData, NodeRef};

use super::{
  options::TableMode,
  raw,
  writer::{Writer, attr},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
  Default,
  Left,
  Center,
  Right,
}

impl Alignment {
  fn of(cell: &ElementData) -> Self {
    let declared = attr(cell, "align").or_else(|| {
      attr(cell, "style").and_then(|style| {
        style.split(';').find_map(|declaration| {
          let (property, value) = declaration.split_once(':')?;
          (property.trim().eq_ignore_ascii_case("text-align"))
            .then(|| value.trim().to_string())
        })
      })
    });

    match declared.as_deref().map(str::to_ascii_lowercase).as_deref() {
      Some("left") => Self::Left,
      Some("center") => Self::Center,
      Some("right") => Self::Right,
      _ => Self::Default,
    }
  }

  const fn delimiter(self) -> &'static str {
    match self {
      Self::Default => "---",
      Self::Left => ":---",
      Self::Center => ":---:",
      Self::Right => "---:",
    }
  }
}

fn is_element(node: &NodeRef, name: &str) -> bool {
  node
    .as_element()
    .is_some_and(|element| &*element.name.local == name)
}

/// Rows of `table`, including those inside its row groups but not those of
/// nested tables.
fn rows(table: &NodeRef) -> Vec<NodeRef> {
  let mut rows = Vec::new();
  for child in table.children() {
    if is_element(&child, "tr") {
      rows.push(child);
    } else if ["thead", "tbody", "tfoot"]
      .iter()
      .any(|group| is_element(&child, group))
    {
      rows.extend(child.children().filter(|row| is_element(row, "tr")));
    }
  }
  rows
}

fn cells(row: &NodeRef) -> Vec<NodeRef> {
  row
    .children()
    .filter(|cell| is_element(cell, "td") || is_element(cell, "th"))
    .collect()
}

impl Writer<'_> {
  /// Convert a `<table>` according to the table mode.
  pub(super) fn table(
    &mut self,
    node: &NodeRef,
    element: &ElementData,
  ) -> Option<String> {
    match self.options.table_mode {
      TableMode::Remove => None,
      TableMode::MultiMarkdown => self.pipe_table(node),
      TableMode::Preserve if self.options.strip_html => {
        let text = self.table_text(node);
        (!text.is_empty()).then_some(text)
      },
      TableMode::Preserve => {
        let mut html = raw::open_tag(element);
        for child in node.children() {
          raw::write_raw(&child, &mut html);
        }
        html.push_str(&raw::close_tag(element));
        Some(html)
      },
    }
  }

  fn cell_text(&mut self, cell: &NodeRef) -> String {
    let was_in_table = self.in_table;
    self.in_table = true;
    let text = self.single_line(cell);
    self.in_table = was_in_table;
    text
  }

  fn pipe_table(&mut self, node: &NodeRef) -> Option<String> {
    let rows = rows(node);
    let header = rows.first()?;
    let header_cells = cells(header);

    let alignments: Vec<Alignment> = header_cells
      .iter()
      .map(|cell| cell.as_element().map_or(Alignment::Default, Alignment::of))
      .collect();

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in &rows {
      let texts = cells(row)
        .iter()
        .map(|cell| self.cell_text(cell))
        .collect();
      grid.push(texts);
    }

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
      return None;
    }

    let format_row = |row: &[String]| {
      let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
      cells.resize(columns, "");
      format!("| {} |", cells.join(" | "))
    };

    let delimiter = (0..columns)
      .map(|i| {
        alignments
          .get(i)
          .copied()
          .unwrap_or(Alignment::Default)
          .delimiter()
      })
      .collect::<Vec<_>>()
      .join(" | ");

    let (head, body) = grid.split_first()?;
    let mut lines = Vec::with_capacity(grid.len() + 1);
    lines.push(format_row(head));
    lines.push(format!("| {delimiter} |"));
    lines.extend(body.iter().map(|row| format_row(row)));
    Some(lines.join("\n"))
  }

  /// Table content as plain paragraphs, one per row.
  fn table_text(&mut self, node: &NodeRef) -> String {
    rows(node)
      .iter()
      .filter_map(|row| {
        let texts: Vec<String> = cells(row)
          .iter()
          .map(|cell| self.single_line(cell))
          .filter(|text| !text.is_empty())
          .collect();
        (!texts.is_empty()).then(|| texts.join(" "))
      })
      .collect::<Vec<_>>()
      .join("\n\n")
  }
}
