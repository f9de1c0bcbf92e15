use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::parser::blocks::AssetNaming;

const CONFIG_NAME: &str = "irodov";
const ENV_PREFIX: &str = "IRODOV";

const SOURCE_CANDIDATES: &[&str] = &[
    "../tex/irodov-problems.tex",
    "tex/irodov-problems.tex",
    "irodov-problems.tex",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// LaTeX source; resolved from `SOURCE_CANDIDATES` when unset.
    pub source: Option<PathBuf>,
    /// Root the viewer serves data files from.
    pub data_dir: PathBuf,
    /// Folder under `data_dir` holding this book's sections.
    pub book_folder: String,
    pub image_dir: String,
    pub image_extension: String,
    /// Id of the first answer entry; its line opens the answers region.
    pub answers_marker: String,
    /// Lines before this index are never taken as the answers region.
    pub answers_min_line: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source: None,
            data_dir: PathBuf::from("public/data"),
            book_folder: "irodov-problems".to_string(),
            image_dir: "images/irodov-problems".to_string(),
            image_extension: "jpg".to_string(),
            answers_marker: "1.1".to_string(),
            answers_min_line: 8000,
        }
    }
}

impl Settings {
    /// Layered load: config file (optional unless given explicitly), then
    /// `IRODOV_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let builder = match file {
            Some(path) => Config::builder().add_source(File::from(path)),
            None => Config::builder().add_source(File::with_name(CONFIG_NAME).required(false)),
        };
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn source_path(&self) -> PathBuf {
        if let Some(p) = &self.source {
            return p.clone();
        }
        SOURCE_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .unwrap_or_else(|| PathBuf::from(SOURCE_CANDIDATES[0]))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join(&self.book_folder)
    }

    pub fn assets(&self) -> AssetNaming {
        AssetNaming {
            dir: self.image_dir.clone(),
            extension: self.image_extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_book_layout() {
        let s = Settings::default();
        assert_eq!(s.output_dir(), PathBuf::from("public/data/irodov-problems"));
        assert_eq!(s.assets().src_for("fig12"), "images/irodov-problems/fig12.jpg");
        assert_eq!(s.answers_marker, "1.1");
    }

    #[test]
    fn explicit_source_wins() {
        let s = Settings {
            source: Some(PathBuf::from("/tmp/book.tex")),
            ..Settings::default()
        };
        assert_eq!(s.source_path(), PathBuf::from("/tmp/book.tex"));
    }

    #[test]
    fn load_from_file_keeps_unset_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "answers_min_line = 12\nimage_extension = \"png\"").unwrap();

        let s = Settings::load(Some(file.path())).unwrap();
        assert_eq!(s.answers_min_line, 12);
        assert_eq!(s.image_extension, "png");
        assert_eq!(s.book_folder, "irodov-problems");
    }

    #[test]
    fn env_marker_is_not_read_as_a_number() {
        std::env::set_var("IRODOV_ANSWERS_MARKER", "2.10");
        let s = Settings::load(None);
        std::env::remove_var("IRODOV_ANSWERS_MARKER");
        assert_eq!(s.unwrap().answers_marker, "2.10");
    }
}
