use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::NO_CITATION;

static CITE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*='#cite_note']").unwrap());
static SUP_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("sup a").unwrap());

/// Resolve the citation markers in one value cell against the reference
/// index. Footnote markers are redundantly encoded (the bare anchor and
/// its superscript wrapper carry the same note id), so resolved targets
/// are deduped per cell, keeping first-encountered order. No resolvable
/// marker degrades to the sentinel, never an error.
pub fn resolve(cell: ElementRef, refs: &HashMap<String, String>) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut targets: Vec<&str> = Vec::new();

    let markers = cell
        .select(&CITE_LINK_SEL)
        .chain(cell.select(&SUP_LINK_SEL));
    for marker in markers {
        let Some(href) = marker.value().attr("href") else {
            continue;
        };
        let Some(note_id) = note_id(href) else {
            continue;
        };
        if let Some(target) = refs.get(note_id).map(String::as_str) {
            if seen.insert(target) {
                targets.push(target);
            }
        }
    }

    if targets.is_empty() {
        NO_CITATION.to_string()
    } else {
        targets.join("; ")
    }
}

/// `…#cite_note-<name>` → the `cite_note-<name>` anchor id.
fn note_id(href: &str) -> Option<&str> {
    let (_, fragment) = href.split_once('#')?;
    fragment.starts_with("cite_note-").then_some(fragment)
}
