use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::{citations, Quad};

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static VALUE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());

// Structural rows inside infoboxes, not data.
const SKIP_ROW_CLASSES: &[&str] = &["infobox-header", "infobox-subheader"];

/// Key/value rows of an infobox region. The label is the row's header
/// cell, the value its data cell; a row contributes a quad only when
/// both are non-empty after trimming.
pub fn parse_infobox(
    region: ElementRef,
    subject: &str,
    refs: &HashMap<String, String>,
) -> Vec<Quad> {
    let mut quads = Vec::new();

    for row in region.select(&ROW_SEL) {
        if row
            .value()
            .classes()
            .any(|c| SKIP_ROW_CLASSES.contains(&c))
        {
            continue;
        }
        let label = row
            .select(&LABEL_SEL)
            .next()
            .map(cell_text)
            .unwrap_or_default();
        let Some(value_cell) = row.select(&VALUE_SEL).next() else {
            continue;
        };
        let value = cell_text(value_cell);
        if label.is_empty() || value.is_empty() {
            continue;
        }
        quads.push(Quad {
            subject: subject.to_string(),
            relationship: label,
            value,
            citation: citations::resolve(value_cell, refs),
        });
    }

    quads
}

/// Generic two-column read of a data table: first cell is the label,
/// second is the value, cells past the second are ignored. Rows with
/// fewer than two cells are skipped.
pub fn parse_table(
    region: ElementRef,
    subject: &str,
    refs: &HashMap<String, String>,
) -> Vec<Quad> {
    let mut quads = Vec::new();

    for row in region.select(&ROW_SEL) {
        let cells: Vec<ElementRef> = row.select(&CELL_SEL).collect();
        if cells.len() < 2 {
            continue;
        }
        let label = cell_text(cells[0]);
        let value_cell = cells[1];
        let value = cell_text(value_cell);
        if label.is_empty() || value.is_empty() {
            continue;
        }
        quads.push(Quad {
            subject: subject.to_string(),
            relationship: label,
            value,
            citation: citations::resolve(value_cell, refs),
        });
    }

    quads
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
