//! Static HTML rendering of a section document, mirroring the viewer's item
//! dispatch. Answers and solutions become `<details>` toggles.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ExtractError, Result};

static DISPLAY_MATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").unwrap());
static INLINE_MATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([^$]+)\$").unwrap());

const ANSWER_LABEL: &str = "Хариу";
const SOLUTION_LABEL: &str = "Бодолт";
const SOLUTION_MARKERS: &[&str] = &["Бодолт", "Шийдэл"];
const MATHJAX_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js";

#[derive(Debug, Deserialize)]
pub struct PreviewDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Text {
        value: String,
    },
    Header {
        value: String,
        #[serde(default)]
        id: Option<String>,
    },
    Note {
        value: String,
    },
    Problem {
        #[serde(default)]
        number: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        statement: Content,
        #[serde(default)]
        image: Option<ImageRef>,
        #[serde(default)]
        answer: Option<Content>,
        #[serde(default)]
        solution: Option<Content>,
    },
    Section {
        #[serde(default)]
        id: String,
        title: String,
        #[serde(default)]
        body: Vec<Value>,
    },
    Subsection {
        title: String,
        #[serde(default)]
        body: Vec<Value>,
    },
    Equation {
        value: String,
        #[serde(default)]
        tag: Option<String>,
    },
    Image(ImageRef),
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub caption: String,
}

/// A statement or answer: plain markup or a list of fragments.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Markup(String),
    Blocks(Vec<Fragment>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Markup(String::new())
    }
}

impl Content {
    fn is_blank(&self) -> bool {
        match self {
            Content::Markup(s) => s.trim().is_empty(),
            Content::Blocks(blocks) => blocks.iter().all(|b| match b {
                Fragment::Text { value } => value.trim().is_empty(),
                Fragment::Equation { .. } | Fragment::Image { .. } => false,
                Fragment::Other => true,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fragment {
    Text {
        value: String,
    },
    Equation {
        value: String,
        #[serde(default)]
        tag: Option<String>,
    },
    Image {
        #[serde(default)]
        src: Option<String>,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        caption: String,
    },
    #[serde(other)]
    Other,
}

pub fn load_document(path: &Path) -> Result<PreviewDocument> {
    let raw = fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ExtractError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// `$$..$$` -> `\[..\]`, then `$..$` -> `\(..\)` for MathJax.
pub fn format_text(text: &str) -> String {
    let display = DISPLAY_MATH_RE.replace_all(text, |c: &regex::Captures| format!("\\[{}\\]", &c[1]));
    INLINE_MATH_RE
        .replace_all(&display, |c: &regex::Captures| format!("\\({}\\)", c[1].trim()))
        .into_owned()
}

/// Re-root an image path under `<base_url>images/`.
pub fn image_url(base_url: &str, src: &str) -> String {
    let src = src.strip_prefix('/').unwrap_or(src);
    let src = src.strip_prefix("images/").unwrap_or(src);
    format!("{}images/{}", base_url, src)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub struct Renderer<'b> {
    base_url: &'b str,
}

impl<'b> Renderer<'b> {
    pub fn new(base_url: &'b str) -> Self {
        Renderer { base_url }
    }

    pub fn page(&self, doc: &PreviewDocument) -> String {
        let mut body = String::new();
        self.items(&doc.body, &mut body);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
<script id=\"MathJax-script\" async src=\"{mathjax}\"></script>\n</head>\n<body>\n\
<h1 id=\"chapter-title\">{title}</h1>\n<div id=\"book-content\">\n{body}</div>\n</body>\n</html>\n",
            title = escape(&doc.title),
            mathjax = MATHJAX_SRC,
            body = body,
        )
    }

    /// Items without a known `type` (the section intro among them) are skipped.
    fn items(&self, values: &[Value], out: &mut String) {
        for value in values {
            match Item::deserialize(value) {
                Ok(item) => self.item(&item, out),
                Err(e) => debug!(error = %e, "skipping item without a renderable type"),
            }
        }
    }

    fn item(&self, item: &Item, out: &mut String) {
        match item {
            Item::Text { value } => {
                let class = if SOLUTION_MARKERS.iter().any(|m| value.contains(m)) {
                    " class=\"solution-text\""
                } else {
                    ""
                };
                out.push_str(&format!("<p{}>{}</p>\n", class, format_text(value)));
            }
            Item::Header { value, id } => {
                let id_attr = id
                    .as_deref()
                    .map(|id| format!(" id=\"{}\"", escape(id)))
                    .unwrap_or_default();
                out.push_str(&format!("<h2{}>{}</h2>\n", id_attr, escape(value)));
            }
            Item::Note { value } => {
                out.push_str(&format!("<div class=\"note-box\">{}</div>\n", format_text(value)));
            }
            Item::Problem {
                number,
                title,
                statement,
                image,
                answer,
                solution,
            } => {
                out.push_str("<div class=\"problem-container\">\n");
                out.push_str(&format!(
                    "<div class=\"problem-header\"><strong>{} {}</strong></div>\n",
                    escape(number),
                    escape(title)
                ));
                out.push_str(&format!(
                    "<div class=\"problem-statement\">{}</div>\n",
                    self.content(statement)
                ));
                if let Some(img) = image {
                    out.push_str(&self.image(&img.src, &img.caption));
                }
                for (label, class, part) in [
                    (ANSWER_LABEL, "problem-answer", answer),
                    (SOLUTION_LABEL, "problem-solution", solution),
                ] {
                    if let Some(c) = part.as_ref().filter(|c| !c.is_blank()) {
                        out.push_str(&format!(
                            "<details class=\"{}\"><summary>{}</summary>{}</details>\n",
                            class,
                            label,
                            self.content(c)
                        ));
                    }
                }
                out.push_str("</div>\n");
            }
            Item::Section { id, title, body } => {
                out.push_str(&format!("<section id=\"{}\">\n<h2>{}</h2>\n", escape(id), escape(title)));
                self.items(body, out);
                out.push_str("</section>\n");
            }
            Item::Subsection { title, body } => {
                out.push_str(&format!("<div class=\"subsection\">\n<h3>{}</h3>\n", escape(title)));
                self.items(body, out);
                out.push_str("</div>\n");
            }
            Item::Equation { value, tag } => out.push_str(&equation(value, tag.as_deref())),
            Item::Image(img) => out.push_str(&self.image(&img.src, &img.caption)),
        }
    }

    fn content(&self, content: &Content) -> String {
        match content {
            Content::Markup(text) => format_text(text),
            Content::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    Fragment::Text { value } => format_text(value),
                    Fragment::Equation { value, tag } => equation(value, tag.as_deref()),
                    Fragment::Image { src, value, caption } => {
                        let src = src.as_deref().or(value.as_deref()).unwrap_or_default();
                        self.image(src, caption)
                    }
                    Fragment::Other => String::new(),
                })
                .collect(),
        }
    }

    fn image(&self, src: &str, caption: &str) -> String {
        let caption_html = if caption.is_empty() {
            String::new()
        } else {
            format!("<p class=\"caption\">{}</p>", escape(caption))
        };
        format!(
            "<div class=\"image-container\"><img src=\"{}\" alt=\"{}\">{}</div>\n",
            escape(&image_url(self.base_url, src)),
            escape(caption),
            caption_html
        )
    }
}

fn equation(value: &str, tag: Option<&str>) -> String {
    let label = tag
        .map(|t| format!(" <span class=\"equation-tag\">({})</span>", escape(t)))
        .unwrap_or_default();
    format!("<div class=\"equation-wrapper\">\\[ {} \\]{}</div>\n", value, label)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(body: Value) -> String {
        let doc: PreviewDocument = serde_json::from_value(json!({ "title": "1.1. Kinematics", "body": body })).unwrap();
        Renderer::new("/irodov/").page(&doc)
    }

    #[test]
    fn math_delimiters_for_mathjax() {
        assert_eq!(format_text("a $$\nx^2\n$$ b $ v_0 $"), "a \\[\nx^2\n\\] b \\(v_0\\)");
    }

    #[test]
    fn image_paths_rerooted() {
        assert_eq!(image_url("/base/", "images/irodov-problems/f.jpg"), "/base/images/irodov-problems/f.jpg");
        assert_eq!(image_url("/base/", "/images/a.jpg"), "/base/images/a.jpg");
        assert_eq!(image_url("", "b.png"), "images/b.png");
    }

    #[test]
    fn intro_item_is_skipped() {
        let html = render(json!([{ "value": "## 1.1. Kinematics\n\nIntro" }]));
        assert!(!html.contains("Intro"));
        assert!(html.contains("<title>1.1. Kinematics</title>"));
    }

    #[test]
    fn problem_with_blocks_and_answer() {
        let html = render(json!([{
            "type": "problem",
            "number": "1.2",
            "title": "",
            "statement": [
                { "type": "text", "value": "Law $$\ny = bt^2\n$$" },
                { "type": "image", "src": "images/irodov-problems/fig-1-2.jpg", "caption": "Fig. 1.2" }
            ],
            "answer": [{ "type": "text", "value": "$y = x^2$" }]
        }]));
        assert!(html.contains("<strong>1.2 </strong>"));
        assert!(html.contains("Law \\[\ny = bt^2\n\\]"));
        assert!(html.contains("<img src=\"/irodov/images/irodov-problems/fig-1-2.jpg\" alt=\"Fig. 1.2\">"));
        assert!(html.contains("<details class=\"problem-answer\"><summary>Хариу</summary>\\(y = x^2\\)</details>"));
        assert!(!html.contains("problem-solution"));
    }

    #[test]
    fn empty_answer_has_no_toggle() {
        let html = render(json!([{
            "type": "problem",
            "number": "2.2",
            "title": "",
            "statement": [{ "type": "text", "value": "Find p." }],
            "answer": [{ "type": "text", "value": "" }]
        }]));
        assert!(!html.contains("<details"));
    }

    #[test]
    fn string_statement_and_solution() {
        let html = render(json!([{
            "type": "problem",
            "number": "3",
            "statement": "Plain $x$",
            "solution": "Because."
        }]));
        assert!(html.contains("Plain \\(x\\)"));
        assert!(html.contains("<summary>Бодолт</summary>Because."));
    }

    #[test]
    fn nested_sections_and_equations() {
        let html = render(json!([{
            "type": "section",
            "id": "s1",
            "title": "Motion",
            "body": [
                { "type": "subsection", "title": "Speed", "body": [
                    { "type": "equation", "value": "v = s/t", "tag": "1.1" },
                    { "type": "note", "value": "Note $a$" },
                    { "type": "header", "value": "H", "id": "h1" }
                ]},
                { "type": "unknown", "value": "x" }
            ]
        }]));
        assert!(html.contains("<section id=\"s1\">\n<h2>Motion</h2>"));
        assert!(html.contains("<h3>Speed</h3>"));
        assert!(html.contains("\\[ v = s/t \\] <span class=\"equation-tag\">(1.1)</span>"));
        assert!(html.contains("<div class=\"note-box\">Note \\(a\\)</div>"));
        assert!(html.contains("<h2 id=\"h1\">H</h2>"));
    }

    #[test]
    fn solution_text_marked() {
        let html = render(json!([{ "type": "text", "value": "<b>Бодолт</b> here" }]));
        assert!(html.contains("<p class=\"solution-text\"><b>Бодолт</b> here</p>"));
    }

    #[test]
    fn fragment_image_falls_back_to_value() {
        let html = render(json!([{
            "type": "problem",
            "number": "4",
            "statement": [{ "type": "image", "value": "old/fig.png" }, { "type": "table" }]
        }]));
        assert!(html.contains("src=\"/irodov/images/old/fig.png\""));
    }

    #[test]
    fn loads_document_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("1.1.json");
        fs::write(&path, r#"{"id":"1.1","title":"T","body":[]}"#).unwrap();
        assert_eq!(load_document(&path).unwrap().title, "T");

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_document(&path), Err(ExtractError::Json { .. })));
    }
}
