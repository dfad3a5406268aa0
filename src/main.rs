mod db;
mod extract;
mod fetch;
mod output;
mod serve;

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use extract::Quad;
use output::Format;

#[derive(Parser)]
#[command(
    name = "wikiquad",
    about = "Extract structured data from Wikipedia pages as quads \
             (subject, relationship, value, citation)"
)]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, default_value = db::DB_PATH)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract quads from a page and write them to a file
    Extract {
        /// Wikipedia page URL
        url: String,
        /// Output file path
        #[arg(short, long, default_value = "output.json")]
        output: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Extract quads and persist them to the database
    Store {
        /// One or more Wikipedia page URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Query stored quads
    Query {
        /// Search by subject (substring)
        #[arg(long)]
        subject: Option<String>,
        /// Search by relationship (substring)
        #[arg(long)]
        relationship: Option<String>,
        /// Search by exact source URL
        #[arg(long)]
        source: Option<String>,
        /// Full-text search across all fields
        #[arg(long)]
        search: Option<String>,
        /// Show database statistics
        #[arg(long)]
        stats: bool,
        /// Machine-readable output format (default: readable table)
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },
    /// Start the HTTP extraction service
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract { url, output: path, format } => {
            fetch::validate_url(&url)?;
            let client = fetch::client()?;
            let html = fetch::fetch_page(&client, &url).await?;
            let quads = extract::extract_quads(&html);
            println!("Extracted {} quads from {}", quads.len(), url);

            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            output::write_quads(&quads, file, format)?;
            println!("Results saved to {} in {} format", path.display(), format);

            preview(&quads);
            Ok(())
        }
        Commands::Store { urls } => {
            for url in &urls {
                fetch::validate_url(url)?;
            }
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let stats = fetch::store_pages_streaming(&conn, urls).await?;
            println!(
                "Stored {} quads from {} pages ({} ok, {} errors).",
                stats.quads, stats.pages, stats.ok, stats.errors
            );
            Ok(())
        }
        Commands::Query { subject, relationship, source, search, stats, format } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            if stats {
                let s = db::get_stats(&conn)?;
                println!("Database statistics:");
                println!("  Total quads:     {}", s.total_quads);
                println!("  Total subjects:  {}", s.total_subjects);
                println!("  Total sources:   {}", s.total_sources);
                println!("  Last extraction: {}", s.last_extraction);
                return Ok(());
            }

            let quads = match (subject, relationship, source, search) {
                (Some(s), _, _, _) => db::by_subject(&conn, &s)?,
                (_, Some(r), _, _) => db::by_relationship(&conn, &r)?,
                (_, _, Some(u), _) => db::by_source(&conn, &u)?,
                (_, _, _, Some(t)) => db::search(&conn, &t)?,
                _ => {
                    println!("Please specify a query type. Use --help for options.");
                    return Ok(());
                }
            };

            if quads.is_empty() {
                println!("No quads found matching the query.");
                return Ok(());
            }
            println!("Found {} quads:\n", quads.len());

            match format {
                Some(f) => output::write_quads(&quads, std::io::stdout().lock(), f)?,
                None => print_table(&quads),
            }
            Ok(())
        }
        Commands::Serve { addr } => serve::run(&addr).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// First few quads, for a quick look at what a page yielded.
fn preview(quads: &[Quad]) {
    if quads.is_empty() {
        return;
    }
    println!("\nPreview of extracted data:");
    for (i, q) in quads.iter().take(5).enumerate() {
        println!(
            "Quad {}: {} | {} | {} | {}",
            i + 1,
            q.subject,
            q.relationship,
            q.value,
            q.citation
        );
    }
}

fn print_table(quads: &[Quad]) {
    for (i, q) in quads.iter().enumerate() {
        println!("Quad {}:", i + 1);
        println!("  Subject:      {}", q.subject);
        println!("  Relationship: {}", q.relationship);
        println!("  Value:        {}", q.value);
        println!("  Citation:     {}", q.citation);
        println!();
    }
}
