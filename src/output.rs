use std::fmt;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;

use crate::extract::Quad;

/// Output rendering, chosen explicitly at each call site (no global
/// format state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Csv,
    Xml,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Csv => "text/csv",
            Format::Xml => "application/xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Xml => "xml",
        })
    }
}

pub fn write_quads<W: Write>(quads: &[Quad], writer: W, format: Format) -> Result<()> {
    match format {
        Format::Json => serde_json::to_writer_pretty(writer, quads)?,
        Format::Csv => {
            let mut w = csv::Writer::from_writer(writer);
            for q in quads {
                w.serialize(q)?;
            }
            w.flush()?;
        }
        Format::Xml => write_xml(quads, writer)?,
    }
    Ok(())
}

fn write_xml<W: Write>(quads: &[Quad], writer: W) -> Result<()> {
    let mut w = quick_xml::Writer::new_with_indent(writer, b' ', 2);
    w.write_event(Event::Start(BytesStart::new("quads")))?;
    for q in quads {
        w.write_event(Event::Start(BytesStart::new("quad")))?;
        write_field(&mut w, "subject", &q.subject)?;
        write_field(&mut w, "relationship", &q.relationship)?;
        write_field(&mut w, "value", &q.value)?;
        write_field(&mut w, "citation", &q.citation)?;
        w.write_event(Event::End(BytesEnd::new("quad")))?;
    }
    w.write_event(Event::End(BytesEnd::new("quads")))?;
    Ok(())
}

fn write_field<W: Write>(w: &mut quick_xml::Writer<W>, name: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Quad> {
        vec![Quad {
            subject: "Example Language".into(),
            relationship: "Designed by".into(),
            value: "Robert X".into(),
            citation: "https://example.com/bio".into(),
        }]
    }

    fn render(format: Format) -> String {
        let mut buf = Vec::new();
        write_quads(&sample(), &mut buf, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_roundtrips() {
        let parsed: Vec<Quad> = serde_json::from_str(&render(Format::Json)).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn csv_has_header_and_row() {
        let out = render(Format::Csv);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("subject,relationship,value,citation"));
        assert_eq!(
            lines.next(),
            Some("Example Language,Designed by,Robert X,https://example.com/bio")
        );
    }

    #[test]
    fn xml_wraps_each_quad() {
        let out = render(Format::Xml);
        assert!(out.starts_with("<quads>"));
        assert!(out.contains("<subject>Example Language</subject>"));
        assert!(out.contains("<citation>https://example.com/bio</citation>"));
        assert!(out.trim_end().ends_with("</quads>"));
    }

    #[test]
    fn xml_escapes_markup_in_values() {
        let quads = vec![Quad {
            subject: "A & B".into(),
            relationship: "<rel>".into(),
            value: "v".into(),
            citation: "no citation".into(),
        }];
        let mut buf = Vec::new();
        write_quads(&quads, &mut buf, Format::Xml).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("A &amp; B"));
        assert!(out.contains("&lt;rel&gt;"));
    }
}
