use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::extract::Quad;

pub const DB_PATH: &str = "quads.db";

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS quads (
            id           INTEGER PRIMARY KEY,
            subject      TEXT NOT NULL,
            relationship TEXT NOT NULL,
            value        TEXT NOT NULL,
            citation     TEXT,
            source_url   TEXT NOT NULL,
            extracted_at TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_quads_subject ON quads(subject);
        CREATE INDEX IF NOT EXISTS idx_quads_relationship ON quads(relationship);
        CREATE INDEX IF NOT EXISTS idx_quads_source_url ON quads(source_url);
        CREATE INDEX IF NOT EXISTS idx_quads_extracted_at ON quads(extracted_at);
        ",
    )?;
    Ok(())
}

// ── Storing ──

/// Append one page's quads in a single transaction, keyed by source URL
/// and extraction timestamp.
pub fn insert_quads(
    conn: &Connection,
    quads: &[Quad],
    source_url: &str,
    extracted_at: DateTime<Utc>,
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO quads (subject, relationship, value, citation, source_url, extracted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let ts = extracted_at.to_rfc3339();
        for q in quads {
            count += stmt.execute(rusqlite::params![
                q.subject, q.relationship, q.value, q.citation, source_url, ts,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Querying ──

pub fn by_subject(conn: &Connection, subject: &str) -> Result<Vec<Quad>> {
    collect_quads(
        conn,
        "SELECT subject, relationship, value, citation FROM quads
         WHERE subject LIKE ?1 ORDER BY extracted_at DESC",
        &format!("%{subject}%"),
    )
}

pub fn by_relationship(conn: &Connection, relationship: &str) -> Result<Vec<Quad>> {
    collect_quads(
        conn,
        "SELECT subject, relationship, value, citation FROM quads
         WHERE relationship LIKE ?1 ORDER BY extracted_at DESC",
        &format!("%{relationship}%"),
    )
}

pub fn by_source(conn: &Connection, source_url: &str) -> Result<Vec<Quad>> {
    collect_quads(
        conn,
        "SELECT subject, relationship, value, citation FROM quads
         WHERE source_url = ?1 ORDER BY extracted_at DESC",
        source_url,
    )
}

/// Substring match across all four quad fields.
pub fn search(conn: &Connection, term: &str) -> Result<Vec<Quad>> {
    collect_quads(
        conn,
        "SELECT subject, relationship, value, citation FROM quads
         WHERE subject LIKE ?1 OR relationship LIKE ?1 OR value LIKE ?1 OR citation LIKE ?1
         ORDER BY extracted_at DESC",
        &format!("%{term}%"),
    )
}

fn collect_quads(conn: &Connection, sql: &str, param: &str) -> Result<Vec<Quad>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([param], |row| {
            Ok(Quad {
                subject: row.get(0)?,
                relationship: row.get(1)?,
                value: row.get(2)?,
                citation: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub total_quads: usize,
    pub total_subjects: usize,
    pub total_sources: usize,
    pub last_extraction: String,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total_quads: usize = conn.query_row("SELECT COUNT(*) FROM quads", [], |r| r.get(0))?;
    let total_subjects: usize =
        conn.query_row("SELECT COUNT(DISTINCT subject) FROM quads", [], |r| r.get(0))?;
    let total_sources: usize =
        conn.query_row("SELECT COUNT(DISTINCT source_url) FROM quads", [], |r| r.get(0))?;
    let last_extraction: Option<String> =
        conn.query_row("SELECT MAX(extracted_at) FROM quads", [], |r| r.get(0))?;
    Ok(Stats {
        total_quads,
        total_subjects,
        total_sources,
        last_extraction: last_extraction.unwrap_or_else(|| "never".into()),
    })
}
