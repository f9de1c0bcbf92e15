use crate::error::{ExtractError, Result};

/// The two halves of the source: problem statements, then answers.
#[derive(Debug, Clone, Copy)]
pub struct Regions<'a> {
    pub problems: &'a str,
    pub answers: &'a str,
    /// Zero-based line index where the answers region starts.
    pub answers_line: usize,
}

/// Split `source` at the first line, at or after `min_line`, that starts with
/// `"<marker>. "`. The problems region excludes that line's preceding newline.
pub fn split_regions<'a>(source: &'a str, marker: &str, min_line: usize) -> Result<Regions<'a>> {
    let prefix = format!("{}. ", marker);
    let mut offset = 0;

    for (idx, line) in source.split('\n').enumerate() {
        if idx >= min_line && line.starts_with(&prefix) {
            let problems = if offset == 0 { "" } else { &source[..offset - 1] };
            return Ok(Regions {
                problems,
                answers: &source[offset..],
                answers_line: idx,
            });
        }
        offset += line.len() + 1;
    }

    Err(ExtractError::AnswersNotFound {
        marker: marker.to_string(),
        min_line,
    })
}
