use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::CatalogEntry;
use crate::error::{ExtractError, Result};
use crate::parser::answers::AnswerTable;
use crate::parser::blocks::{build_content, convert_latex, AssetNaming, ContentBlock};
use crate::parser::sections::SectionSpan;
use crate::parser::ParsedSource;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

static SUBSECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\subsection\*\{[^}]+\}").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct SectionDocument {
    pub id: String,
    pub title: String,
    pub body: Vec<BodyItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BodyItem {
    Intro { value: String },
    Problem(ProblemItem),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProblemItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub number: String,
    pub title: String,
    pub statement: Vec<ContentBlock>,
    pub answer: Vec<ContentBlock>,
}

impl SectionDocument {
    pub fn problems(&self) -> impl Iterator<Item = &ProblemItem> {
        self.body.iter().filter_map(|item| match item {
            BodyItem::Problem(p) => Some(p),
            BodyItem::Intro { .. } => None,
        })
    }
}

/// Assemble one document per catalog entry that was found in the source.
/// Entries without a matching heading are skipped with a warning.
pub fn build_documents<'c>(
    catalog: &'c [CatalogEntry],
    parsed: &ParsedSource<'_>,
    assets: &AssetNaming,
) -> Vec<(&'c CatalogEntry, SectionDocument)> {
    let index = parsed.section_index();
    let found: Vec<_> = catalog
        .iter()
        .filter_map(|entry| match index.get(entry.id) {
            Some(span) => Some((entry, *span)),
            None => {
                warn!(section = entry.id, "section not found in source, skipping");
                None
            }
        })
        .collect();

    assemble(found, &parsed.answers, assets)
}

#[cfg(feature = "rayon")]
fn assemble<'c>(
    found: Vec<(&'c CatalogEntry, &SectionSpan<'_>)>,
    answers: &AnswerTable<'_>,
    assets: &AssetNaming,
) -> Vec<(&'c CatalogEntry, SectionDocument)> {
    found
        .into_par_iter()
        .map(|(entry, span)| (entry, build_document(entry, span, answers, assets)))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn assemble<'c>(
    found: Vec<(&'c CatalogEntry, &SectionSpan<'_>)>,
    answers: &AnswerTable<'_>,
    assets: &AssetNaming,
) -> Vec<(&'c CatalogEntry, SectionDocument)> {
    found
        .into_iter()
        .map(|(entry, span)| (entry, build_document(entry, span, answers, assets)))
        .collect()
}

pub fn build_document(
    entry: &CatalogEntry,
    span: &SectionSpan<'_>,
    answers: &AnswerTable<'_>,
    assets: &AssetNaming,
) -> SectionDocument {
    if span.heading != entry.title {
        debug!(section = entry.id, heading = %span.heading, "source heading differs from catalog title");
    }

    let mut body = Vec::with_capacity(span.problems.len() + 1);
    body.push(BodyItem::Intro {
        value: intro_text(span.intro, entry.title),
    });

    for problem in &span.problems {
        let raw_answer = answers.get(problem.number).unwrap_or_default();
        let answer = if raw_answer.trim().is_empty() {
            warn!(problem = problem.number, "no answer found, emitting an empty answer");
            vec![ContentBlock::empty()]
        } else {
            build_content(raw_answer, assets)
        };

        body.push(BodyItem::Problem(ProblemItem {
            kind: "problem",
            number: problem.number.to_string(),
            title: String::new(),
            statement: build_content(problem.statement, assets),
            answer,
        }));
    }

    SectionDocument {
        id: entry.id.to_string(),
        title: entry.title.to_string(),
        body,
    }
}

/// Markdown heading with the catalog title, then the converted intro with its
/// `\subsection*` heading removed.
fn intro_text(raw: &str, title: &str) -> String {
    let without_heading = SUBSECTION_RE.replace(raw, "");
    let body = convert_latex(without_heading.trim());
    format!("## {}\n\n{}", title, body)
}

pub fn output_path(output_dir: &Path, entry: &CatalogEntry) -> PathBuf {
    output_dir.join(entry.part).join(format!("{}.json", entry.id))
}

/// Write `<output_dir>/<part>/<id>.json`, replacing any existing file.
pub fn write_document(output_dir: &Path, entry: &CatalogEntry, doc: &SectionDocument) -> Result<PathBuf> {
    let path = output_path(output_dir, entry);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ExtractError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(doc)?;
    fs::write(&path, json).map_err(|source| ExtractError::Write {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), problems = doc.problems().count(), "section written");
    Ok(path)
}
