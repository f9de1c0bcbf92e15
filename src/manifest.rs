//! Navigation entry for the viewer's library manifest.
//!
//! The viewer loads `data/<folder>/<file>` for a section, so each chapter
//! (a part of the book) names its folder relative to the data root.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::catalog::{self, CatalogEntry, Part};
use crate::emit::output_path;
use crate::error::{ExtractError, Result};

#[derive(Debug, Serialize)]
pub struct Library {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Serialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub folder: String,
    pub sections: Vec<SectionRef>,
}

#[derive(Debug, Serialize)]
pub struct SectionRef {
    pub id: String,
    pub title: String,
    pub file: String,
}

/// List the sections whose JSON exists under `output_dir`, grouped by part.
pub fn build_library(parts: &[Part], sections: &[CatalogEntry], output_dir: &Path, book_folder: &str) -> Library {
    let chapters = parts
        .iter()
        .filter_map(|part| {
            let refs: Vec<_> = catalog::sections_in(sections, part.id)
                .filter(|entry| {
                    let present = output_path(output_dir, entry).is_file();
                    if !present {
                        warn!(section = entry.id, "no generated file, left out of manifest");
                    }
                    present
                })
                .map(|entry| SectionRef {
                    id: entry.id.to_string(),
                    title: entry.title.to_string(),
                    file: format!("{}.json", entry.id),
                })
                .collect();

            if refs.is_empty() {
                return None;
            }
            Some(Chapter {
                id: part.id.to_string(),
                title: part.title.to_string(),
                folder: format!("{}/{}", book_folder, part.id),
                sections: refs,
            })
        })
        .collect();

    Library {
        books: vec![Book {
            id: catalog::BOOK_ID.to_string(),
            title: catalog::BOOK_TITLE.to_string(),
            chapters,
        }],
    }
}

pub fn to_json(library: &Library) -> Result<String> {
    Ok(serde_json::to_string_pretty(library)?)
}

/// Write `library` to `path`. Books already in an existing file are kept; one
/// with the same id is replaced in place.
pub fn write_library(path: &Path, library: &Library) -> Result<()> {
    let mut merged = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).map_err(|source| ExtractError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => json!({ "books": [] }),
        Err(source) => {
            return Err(ExtractError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let books = merged
        .as_object_mut()
        .map(|o| o.entry("books").or_insert_with(|| json!([])))
        .and_then(Value::as_array_mut)
        .ok_or_else(|| ExtractError::NotALibrary { path: path.to_path_buf() })?;

    for book in &library.books {
        let value = serde_json::to_value(book)?;
        match books.iter_mut().find(|b| b["id"] == book.id.as_str()) {
            Some(slot) => *slot = value,
            None => books.push(value),
        }
    }

    let json = serde_json::to_string_pretty(&merged)?;
    fs::write(path, json).map_err(|source| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PARTS, SECTIONS};

    fn touch(dir: &Path, part: &str, id: &str) {
        let p = dir.join(part);
        fs::create_dir_all(&p).unwrap();
        fs::write(p.join(format!("{}.json", id)), "{}").unwrap();
    }

    #[test]
    fn only_generated_sections_listed() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "part_1", "1.1");
        touch(dir.path(), "part_1", "1.2");
        touch(dir.path(), "part_2", "2.1");

        let lib = build_library(PARTS, SECTIONS, dir.path(), "irodov-problems");
        let book = &lib.books[0];
        assert_eq!(book.id, "irodov_problems");
        assert_eq!(book.chapters.len(), 2);
        assert_eq!(book.chapters[0].folder, "irodov-problems/part_1");
        assert_eq!(book.chapters[0].title, "Physical Fundamentals of Mechanics");

        let files: Vec<_> = book.chapters[0].sections.iter().map(|s| s.file.as_str()).collect();
        assert_eq!(files, vec!["1.1.json", "1.2.json"]);
        assert_eq!(book.chapters[1].sections[0].title, "2.1. Equation of the Gas State. Processes");
    }

    #[test]
    fn empty_output_gives_book_without_chapters() {
        let dir = tempfile::TempDir::new().unwrap();
        let lib = build_library(PARTS, SECTIONS, dir.path(), "irodov-problems");
        assert!(lib.books[0].chapters.is_empty());
    }

    #[test]
    fn written_manifest_is_viewer_shaped() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "part_3", "3.4");
        let lib = build_library(PARTS, SECTIONS, dir.path(), "irodov-problems");

        let out = dir.path().join("library.json");
        write_library(&out, &lib).unwrap();
        let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let section = &v["books"][0]["chapters"][0]["sections"][0];
        assert_eq!(section["id"], "3.4");
        assert_eq!(section["file"], "3.4.json");
        assert_eq!(v["books"][0]["chapters"][0]["id"], "part_3");
    }

    #[test]
    fn existing_library_keeps_other_books() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "part_1", "1.1");
        let out = dir.path().join("library.json");
        fs::write(
            &out,
            r#"{"books":[{"id":"other_book","title":"Other","chapters":[]},{"id":"irodov_problems","title":"stale","chapters":[]}]}"#,
        )
        .unwrap();

        let lib = build_library(PARTS, SECTIONS, dir.path(), "irodov-problems");
        write_library(&out, &lib).unwrap();

        let v: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let books = v["books"].as_array().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0]["id"], "other_book");
        assert_eq!(books[1]["title"], "Problems in General Physics");
        assert_eq!(books[1]["chapters"][0]["sections"][0]["id"], "1.1");
    }

    #[test]
    fn existing_file_of_another_shape_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("library.json");
        fs::write(&out, "[1, 2]").unwrap();

        let lib = build_library(PARTS, SECTIONS, dir.path(), "irodov-problems");
        assert!(matches!(write_library(&out, &lib), Err(ExtractError::NotALibrary { .. })));
        assert_eq!(fs::read_to_string(&out).unwrap(), "[1, 2]");
    }
}
