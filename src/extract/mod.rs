pub mod citations;
pub mod refs;
pub mod rows;

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Sentinel citation for values with no resolvable citation marker.
/// Returned deliberately instead of an error: partial or messy markup
/// must never abort extraction of the rest of the page.
pub const NO_CITATION: &str = "no citation";

/// One structured data point: (subject, relationship, value, citation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad {
    pub subject: String,
    pub relationship: String,
    pub value: String,
    pub citation: String,
}

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#firstHeading").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static INFOBOX_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".infobox").unwrap());
static WIKITABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").unwrap());

/// Extract all quads from one rendered page: resolve the page subject,
/// build the reference index once, then walk infoboxes followed by
/// wikitables in document order. A page with no structured regions
/// yields an empty vec, not an error.
pub fn extract_quads(html: &str) -> Vec<Quad> {
    let doc = Html::parse_document(html);
    let subject = page_subject(&doc);
    let refs = refs::build_reference_index(&doc);

    let mut quads = Vec::new();
    for infobox in doc.select(&INFOBOX_SEL) {
        quads.extend(rows::parse_infobox(infobox, &subject, &refs));
    }
    for table in doc.select(&WIKITABLE_SEL) {
        quads.extend(rows::parse_table(table, &subject, &refs));
    }
    quads
}

/// Primary heading text, falling back to the document title. An empty
/// subject is allowed and simply propagates to every quad.
fn page_subject(doc: &Html) -> String {
    let heading = doc
        .select(&HEADING_SEL)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    if !heading.is_empty() {
        return heading;
    }
    doc.select(&TITLE_SEL)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_PAGE: &str = r##"
        <html><head><title>Example Language - Encyclopedia</title></head><body>
        <h1 id="firstHeading">Example Language</h1>
        <table class="infobox">
          <tr class="infobox-header"><th colspan="2">Example Language</th></tr>
          <tr><th>Designed by</th><td>Robert X<sup><a href="#cite_note-1">[1]</a></sup></td></tr>
          <tr><th>Paradigm</th><td>Multi-paradigm<sup><a href="#cite_note-missing">[2]</a></sup></td></tr>
        </table>
        <div class="reflist">
          <ol>
            <li id="cite_note-1"><a href="https://example.com/bio">bio</a></li>
          </ol>
        </div>
        </body></html>
    "##;

    #[test]
    fn example_language_infobox() {
        let quads = extract_quads(EXAMPLE_PAGE);
        assert_eq!(quads.len(), 2);
        assert_eq!(
            quads[0],
            Quad {
                subject: "Example Language".into(),
                relationship: "Designed by".into(),
                value: "Robert X[1]".into(),
                citation: "https://example.com/bio".into(),
            }
        );
        // Marker present but absent from the reference index.
        assert_eq!(quads[1].citation, NO_CITATION);
    }

    #[test]
    fn no_structured_regions() {
        let html = "<html><body><h1 id='firstHeading'>Plain</h1><p>prose only</p></body></html>";
        assert!(extract_quads(html).is_empty());
    }

    #[test]
    fn subject_falls_back_to_title() {
        let html = r#"
            <html><head><title>Fallback Title</title></head><body>
            <table class="wikitable"><tr><td>Key</td><td>Value</td></tr></table>
            </body></html>
        "#;
        let quads = extract_quads(html);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].subject, "Fallback Title");
    }

    #[test]
    fn missing_subject_is_empty_not_error() {
        let html = r#"<table class="wikitable"><tr><td>Key</td><td>Value</td></tr></table>"#;
        let quads = extract_quads(html);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].subject, "");
    }

    #[test]
    fn infoboxes_before_wikitables() {
        let html = r#"
            <html><body><h1 id="firstHeading">Page</h1>
            <table class="wikitable"><tr><td>Table key</td><td>Table value</td></tr></table>
            <table class="infobox"><tr><th>Box key</th><td>Box value</td></tr></table>
            </body></html>
        "#;
        let quads = extract_quads(html);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].relationship, "Box key");
        assert_eq!(quads[1].relationship, "Table key");
    }

    #[test]
    fn extract_is_idempotent() {
        assert_eq!(extract_quads(EXAMPLE_PAGE), extract_quads(EXAMPLE_PAGE));
    }

    #[test]
    fn example_language_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/example_language.html").unwrap();
        let quads = extract_quads(&html);

        assert!(quads.iter().all(|q| q.subject == "Example Language"));
        // 4 infobox rows survive (header, subheader and the empty
        // License row are dropped), then 3 wikitable rows.
        assert_eq!(quads.len(), 7);

        assert_eq!(quads[0].relationship, "Designed by");
        assert_eq!(quads[0].value, "Robert X[1]");
        assert_eq!(quads[0].citation, "https://example.com/bio");

        assert_eq!(quads[1].relationship, "First appeared");
        assert_eq!(quads[1].citation, "https://example.com/history");

        // Two markers over the same note collapse to one citation.
        assert_eq!(quads[2].relationship, "Typing discipline");
        assert_eq!(quads[2].citation, "https://example.com/bio");

        // Marker with no entry in the references section.
        assert_eq!(quads[3].relationship, "Website");
        assert_eq!(quads[3].citation, NO_CITATION);

        // Wikitable: first two cells per row, third ignored.
        assert_eq!(quads[4].relationship, "Version");
        assert_eq!(quads[4].value, "Release date");
        assert_eq!(quads[5].relationship, "1.0");
        assert_eq!(quads[5].value, "2001");
        assert_eq!(quads[6].relationship, "2.0");
        assert_eq!(quads[6].value, "2009[2]");
        assert_eq!(quads[6].citation, "https://example.com/history");
    }
}
