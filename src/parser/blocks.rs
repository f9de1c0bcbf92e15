use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::Serialize;
use tracing::warn;

// ── Line breaks and math ──
static LINE_BREAK_EOL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)\\\\\s*$").unwrap());
static LINE_BREAK_NL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\\\s*\n").unwrap());
static DISPLAY_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\[\s*").unwrap());
static DISPLAY_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\\\]").unwrap());
static INLINE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\(").unwrap());
static INLINE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\)").unwrap());
static MATH_ENV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\\begin\{(equation|align)\*?\}(.*?)\\end\{(?:equation|align)\*?\}").unwrap()
});

// ── Lists ──
static LIST_ENV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(?:begin|end)\{(?:itemize|enumerate)\}").unwrap());
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*\\item\s*").unwrap());

// ── Figures ──
static FIGURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\begin\{figure\}(.*?)\\end\{figure\}").unwrap());
static GRAPHIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\includegraphics(?:\[.*?\])?\{([^}]+)\}").unwrap());
static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\caption\{([^}]*)\}").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\textit\{|\}").unwrap());

// ── Content-free directives ──
static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\\(?:tag|label|ref|cite|captionsetup)\{[^}]*\}",
        r"|\\(?:begin|end)\{center\}",
        r"|\\includegraphics[^\n]*",
        r"|\\nonumber",
        r"|\\[hv]space\*?\{[^}]*\}",
        r"|\\(?:med|big|small)skip",
        r"|\\(?:noindent|centering)\s*",
    ))
    .unwrap()
});
static TEXT_WRAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\text\{([^}]*)\}").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Renderable unit of a statement or answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { value: String },
    Image { src: String, caption: String },
}

impl ContentBlock {
    pub fn empty() -> Self {
        ContentBlock::Text {
            value: String::new(),
        }
    }
}

/// Where figure graphics live, relative to the viewer root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNaming {
    pub dir: String,
    pub extension: String,
}

impl AssetNaming {
    pub fn src_for(&self, graphic: &str) -> String {
        format!("{}/{}.{}", self.dir, graphic, self.extension)
    }
}

/// Convert the handled LaTeX subset to markup with `$`/`$$` math.
pub fn convert_latex(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let t = LINE_BREAK_EOL_RE.replace_all(text, "");
    let t = LINE_BREAK_NL_RE.replace_all(&t, "\n");

    let t = DISPLAY_OPEN_RE.replace_all(&t, NoExpand("$$\n"));
    let t = DISPLAY_CLOSE_RE.replace_all(&t, NoExpand("\n$$"));
    let t = INLINE_OPEN_RE.replace_all(&t, NoExpand("$"));
    let t = INLINE_CLOSE_RE.replace_all(&t, NoExpand("$"));
    let t = MATH_ENV_RE.replace_all(&t, |caps: &regex::Captures| format!("$$\n{}\n$$", caps[2].trim()));

    let t = LIST_ENV_RE.replace_all(&t, "");
    let t = ITEM_RE.replace_all(&t, NoExpand("- "));

    let t = FIGURE_RE.replace_all(&t, "");
    let t = DIRECTIVE_RE.replace_all(&t, "");
    let t = TEXT_WRAP_RE.replace_all(&t, "${1}");
    let t = BLANK_RUN_RE.replace_all(&t, "\n\n");

    t.trim().to_string()
}

/// Split a raw span into text and image blocks in source order. Never empty.
pub fn build_content(raw: &str, assets: &AssetNaming) -> Vec<ContentBlock> {
    let mut items = Vec::new();
    let mut last = 0;

    for caps in FIGURE_RE.captures_iter(raw) {
        let whole = caps.get(0).unwrap();
        push_text(&raw[last..whole.start()], &mut items);
        match figure_block(&caps[1], assets) {
            Some(image) => items.push(image),
            None => warn!(figure = whole.as_str(), "figure without \\includegraphics dropped"),
        }
        last = whole.end();
    }
    push_text(&raw[last..], &mut items);

    if items.is_empty() {
        items.push(ContentBlock::empty());
    }
    items
}

fn push_text(segment: &str, items: &mut Vec<ContentBlock>) {
    let value = convert_latex(segment);
    if !value.trim().is_empty() {
        items.push(ContentBlock::Text { value });
    }
}

fn figure_block(inner: &str, assets: &AssetNaming) -> Option<ContentBlock> {
    let graphic = GRAPHIC_RE.captures(inner)?;
    let caption = CAPTION_RE
        .captures(inner)
        .map(|c| ITALIC_RE.replace_all(&c[1], "").into_owned())
        .unwrap_or_default();
    Some(ContentBlock::Image {
        src: assets.src_for(&graphic[1]),
        caption,
    })
}
