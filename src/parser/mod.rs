pub mod answers;
pub mod blocks;
pub mod regions;
pub mod sections;

use std::collections::HashMap;

use tracing::info;

use crate::error::Result;
use answers::AnswerTable;
use sections::SectionSpan;

/// Everything the emitter needs, borrowed from the loaded source.
pub struct ParsedSource<'a> {
    pub answers_line: usize,
    pub sections: Vec<SectionSpan<'a>>,
    pub answers: AnswerTable<'a>,
}

impl<'a> ParsedSource<'a> {
    pub fn section_index(&self) -> HashMap<&'a str, &SectionSpan<'a>> {
        sections::index_by_id(&self.sections)
    }
}

/// Segment the source: regions -> answer table -> sections -> problems.
pub fn parse_source<'a>(source: &'a str, answers_marker: &str, min_line: usize) -> Result<ParsedSource<'a>> {
    let regions = regions::split_regions(source, answers_marker, min_line)?;
    info!(line = regions.answers_line + 1, "answers region located");

    let answers = AnswerTable::parse(regions.answers);
    info!(answers = answers.len(), "parsed answers");

    let sections = sections::split_sections(regions.problems)?;
    info!(sections = sections.len(), "found section headings");

    Ok(ParsedSource {
        answers_line: regions.answers_line,
        sections,
        answers,
    })
}
