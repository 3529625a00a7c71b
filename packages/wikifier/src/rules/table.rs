//! `|cell|cell|` tables.
//!
//! ```text
//! |Caption|c          caption (moved to the top)
//! |!Head|!Head|h      thead, th cells
//! |a|b|               tbody rows, alternating oddRow/evenRow
//! |>|wide|            colspan: `>` merges into the next cell
//! |~|x|               rowspan: `~` merges into the cell above
//! |Foot|f             tfoot
//! |myClass|k          class of the table element
//! ```
//!
//! Cells and rows are collected first and assembled once the last row is
//! read, since spans are applied to cells created earlier.

use super::{compile, find_regex, FormatterRule};
use crate::node::Node;
use crate::wikifier::Wikifier;
use regex::Regex;
use std::ops::Range;

pub struct Table {
    open: Regex,
    row: Regex,
    cell: Regex,
    cell_term: Regex,
    row_term: Regex,
}

enum Section {
    Caption { align: &'static str, children: Vec<Node> },
    Rows { tag: &'static str, rows: Vec<Row> },
}

struct Row {
    class: &'static str,
    cells: Vec<usize>,
}

/// Cells live in one arena so spans can reach back into earlier rows
#[derive(Default)]
struct Builder {
    class: Option<String>,
    sections: Vec<Section>,
    cells: Vec<Node>,
    /// Most recent real cell per column, with its row span
    columns: Vec<Option<(usize, usize)>>,
}

impl Builder {
    fn build(mut self) -> Node {
        let mut table = Node::element("table");
        if let Some(class) = &self.class {
            table.set_attr("class", class.as_str());
        }

        let mut children = Vec::with_capacity(self.sections.len());
        for section in self.sections {
            match section {
                Section::Caption { align, children: content } => {
                    children.push(Node::element("caption").with_attr("align", align).with_children(content));
                }
                Section::Rows { tag, rows } => {
                    let rows = rows
                        .into_iter()
                        .map(|row| {
                            let cells = row
                                .cells
                                .into_iter()
                                .map(|id| std::mem::replace(&mut self.cells[id], Node::text("")))
                                .collect();
                            Node::element("tr").with_class(row.class).with_children(cells)
                        })
                        .collect();
                    children.push(Node::element(tag).with_children(rows));
                }
            }
        }
        table.with_children(children)
    }
}

fn section_tag(kind: &str) -> &'static str {
    match kind {
        "h" => "thead",
        "f" => "tfoot",
        _ => "tbody",
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            open: compile(r"(?m)^\|[^\n]*\|[fhck]?$"),
            row: compile(r"(?m)^\|([^\n]*)\|([fhck]?)$"),
            cell: compile(r"(?m)(?:\|([^\n\|]*)\|)|(\|[fhck]?$\n?)"),
            cell_term: compile(r"(?: *)\|"),
            row_term: compile(r"(?m)\|c?$\n?"),
        }
    }

    fn row_body(&self, w: &mut Wikifier<'_>, table: &mut Builder) -> Vec<usize> {
        let mut cells = Vec::new();
        let mut col = 0;
        let mut col_span = 1;
        let mut prev_cell: Option<usize> = None;

        while let Some(caps) = w.lookahead(&self.cell, w.position()) {
            let Some(whole) = caps.get(0) else { break };

            if caps.get(2).is_some() {
                // End of row; a trailing `>` widens the last real cell
                if let (Some(id), true) = (prev_cell, col_span > 1) {
                    table.cells[id].set_attr("colspan", col_span.to_string());
                }
                w.set_position(whole.end());
                break;
            }

            let content = caps.get(1).map_or("", |m| m.as_str());
            if table.columns.len() <= col {
                table.columns.resize(col + 1, None);
            }

            match content {
                "~" => {
                    if let Some((id, span)) = table.columns[col].as_mut() {
                        *span += 1;
                        table.cells[*id].set_attr("rowspan", span.to_string());
                        table.cells[*id].set_attr("valign", "center");
                    }
                    w.set_position(whole.end() - 1);
                }
                ">" => {
                    col_span += 1;
                    w.set_position(whole.end() - 1);
                }
                _ => {
                    w.set_position(whole.start() + 1);
                    let styles = w.inline_css();
                    let space_left = w.source()[w.position()..].starts_with(' ');
                    if space_left {
                        let rest = &w.source()[w.position()..];
                        let skipped = rest.len() - rest.trim_start_matches(' ').len();
                        w.set_position(w.position() + skipped);
                    }

                    let tag = if w.source()[w.position()..].starts_with('!') {
                        w.set_position(w.position() + 1);
                        "th"
                    } else {
                        "td"
                    };

                    let mut children = Vec::new();
                    let term = w.sub_wikify(&mut children, Some(&self.cell_term));
                    let space_right = term.as_ref().map_or(false, |t| t.len() >= 2);

                    let mut cell = Node::element(tag).with_children(children);
                    if col_span > 1 {
                        cell.set_attr("colspan", col_span.to_string());
                        col_span = 1;
                    }
                    for (name, value) in styles {
                        cell.set_style(name, value);
                    }
                    match (space_left, space_right) {
                        (true, true) => cell.set_attr("align", "center"),
                        (false, true) => cell.set_attr("align", "left"),
                        (true, false) => cell.set_attr("align", "right"),
                        (false, false) => {}
                    }

                    let id = table.cells.len();
                    table.cells.push(cell);
                    table.columns[col] = Some((id, 1));
                    cells.push(id);
                    prev_cell = Some(id);

                    // The closing `|` opens the next cell
                    if let Some(term) = term {
                        w.set_position(term.end - 1);
                    }
                }
            }
            col += 1;
        }

        cells
    }
}

impl FormatterRule for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let mut table = Builder::default();
        let mut current_kind: Option<String> = None;
        let mut row_count = 0;
        w.set_position(found.start);

        while let Some(caps) = w.lookahead(&self.row, w.position()) {
            let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let kind = caps.get(2).map_or("", |m| m.as_str());

            if kind == "k" {
                table.class = Some(content.as_str().to_string());
                w.set_position((whole.end() + 1).min(w.source().len()));
                continue;
            }

            if current_kind.as_deref() != Some(kind) {
                let section = if kind == "c" {
                    Section::Caption {
                        align: if row_count == 0 { "top" } else { "bottom" },
                        children: Vec::new(),
                    }
                } else {
                    Section::Rows {
                        tag: section_tag(kind),
                        rows: Vec::new(),
                    }
                };
                if kind == "c" {
                    table.sections.insert(0, section);
                } else {
                    table.sections.push(section);
                }
                current_kind = Some(kind.to_string());
            }

            if kind == "c" {
                w.set_position(whole.start() + 1);
                let mut children = Vec::new();
                w.sub_wikify(&mut children, Some(&self.row_term));
                if let Some(Section::Caption { children: caption, .. }) = table.sections.first_mut() {
                    caption.extend(children);
                }
                continue;
            }

            w.set_position(whole.start());
            let class = if row_count % 2 == 0 { "evenRow" } else { "oddRow" };
            let cells = self.row_body(w, &mut table);
            if let Some(Section::Rows { rows, .. }) = table.sections.last_mut() {
                rows.push(Row { class, cells });
            }
            row_count += 1;
        }

        output.push(table.build());
    }
}
