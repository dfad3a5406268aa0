use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

// Reference sections show up under several markup forms; none of them
// is guaranteed to be present.
static REF_SECTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#References, #references, .reflist, .references").unwrap());
static REF_LIST_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ol.references li").unwrap());
static LIST_ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static EXTERNAL_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href^='http']").unwrap());

/// Build the per-page reference index: reference anchor id → first
/// scheme-qualified external link inside that reference entry.
///
/// First writer wins per id, both within one entry and across the two
/// scan passes. Entries with no external link are left out, so
/// citations to them resolve to the sentinel. A page without any
/// references section yields an empty index.
pub fn build_reference_index(doc: &Html) -> HashMap<String, String> {
    let mut index = HashMap::new();

    for section in doc.select(&REF_SECTION_SEL) {
        for item in section.select(&LIST_ITEM_SEL) {
            record_entry(item, &mut index);
        }
    }

    // ol.references also appears outside the recognized section
    // wrappers, notably when the section heading carries the id.
    for item in doc.select(&REF_LIST_SEL) {
        record_entry(item, &mut index);
    }

    index
}

fn record_entry(item: ElementRef, index: &mut HashMap<String, String>) {
    let Some(id) = item.value().attr("id") else {
        return;
    };
    if index.contains_key(id) {
        return;
    }
    let first_link = item
        .select(&EXTERNAL_LINK_SEL)
        .filter_map(|a| a.value().attr("href"))
        .next();
    if let Some(href) = first_link {
        index.insert(id.to_string(), href.to_string());
    }
}
