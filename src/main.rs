mod catalog;
mod emit;
mod error;
mod manifest;
mod parser;
mod preview;
mod settings;
mod stats;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use error::ExtractError;
use settings::Settings;

#[derive(Parser)]
#[command(name = "irodov_extract", about = "Convert the Irodov LaTeX source into viewer JSON")]
struct Cli {
    /// Config file (default: ./irodov.{toml,json,yaml} if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one JSON document per catalog section
    Extract {
        /// LaTeX source file
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Data root the viewer serves from
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Show what the source contains without writing anything
    Stats {
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// Build the library manifest from the generated sections
    Manifest {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render a section JSON document to static HTML
    Preview {
        json: PathBuf,
        /// Output file (default: <json>.html)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Prefix for image URLs
        #[arg(long, default_value = "/")]
        base_url: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    let result = match cli.command {
        Commands::Extract { source, data_dir } => {
            if source.is_some() {
                settings.source = source;
            }
            if let Some(dir) = data_dir {
                settings.data_dir = dir;
            }
            extract(&settings)
        }
        Commands::Stats { source } => {
            if source.is_some() {
                settings.source = source;
            }
            let path = settings.source_path();
            let text = read_source(&path)?;
            let parsed = parser::parse_source(&text, &settings.answers_marker, settings.answers_min_line)?;
            stats::collect(catalog::SECTIONS, &parsed).print();
            Ok(())
        }
        Commands::Manifest { data_dir, out } => {
            if let Some(dir) = data_dir {
                settings.data_dir = dir;
            }
            let library = manifest::build_library(
                catalog::PARTS,
                catalog::SECTIONS,
                &settings.output_dir(),
                &settings.book_folder,
            );
            match out {
                Some(path) => {
                    manifest::write_library(&path, &library)?;
                    println!("Manifest written to {}", path.display());
                }
                None => println!("{}", manifest::to_json(&library)?),
            }
            Ok(())
        }
        Commands::Preview { json, out, base_url } => {
            let doc = preview::load_document(&json)?;
            let html = preview::Renderer::new(&base_url).page(&doc);
            let out = out.unwrap_or_else(|| json.with_extension("html"));
            fs::write(&out, html).map_err(|source| ExtractError::Write {
                path: out.clone(),
                source,
            })?;
            println!("Preview written to {}", out.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    info!(path = %path.display(), "reading source");
    let text = fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text)
}

/// A failed write is logged and the remaining sections still run; the command
/// fails at the end if any write failed.
fn extract(settings: &Settings) -> anyhow::Result<()> {
    let path = settings.source_path();
    let text = read_source(&path)?;
    let parsed = parser::parse_source(&text, &settings.answers_marker, settings.answers_min_line)?;

    let docs = emit::build_documents(catalog::SECTIONS, &parsed, &settings.assets());
    let output_dir = settings.output_dir();

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = 0;
    let mut failed = 0;
    for (entry, doc) in &docs {
        pb.set_message(entry.id);
        match emit::write_document(&output_dir, entry, doc) {
            Ok(_) => written += 1,
            Err(e) => {
                failed += 1;
                pb.suspend(|| error!(section = entry.id, error = %e, "failed to write section"));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let problems: usize = docs.iter().map(|(_, d)| d.problems().count()).sum();
    println!(
        "Wrote {} sections ({} problems) to {}.",
        written,
        problems,
        output_dir.display()
    );

    if failed > 0 {
        anyhow::bail!("{} of {} sections could not be written", failed, docs.len());
    }
    Ok(())
}

/// `4.5s`, `3m 7s` or `1h 0m 5s`.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{:.1}s", d.as_secs_f64()),
        (0, _) => format!("{}m {}s", m, s),
        _ => format!("{}h {}m {}s", h, m, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_by_magnitude() {
        assert_eq!(format_duration(Duration::from_millis(4_500)), "4.5s");
        assert_eq!(format_duration(Duration::from_secs(187)), "3m 7s");
        assert_eq!(format_duration(Duration::from_secs(3_605)), "1h 0m 5s");
    }
}
