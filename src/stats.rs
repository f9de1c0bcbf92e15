use crate::catalog::CatalogEntry;
use crate::parser::ParsedSource;

pub struct Stats<'c> {
    pub answers_line: usize,
    pub answers: usize,
    pub sections_found: usize,
    pub entries: Vec<EntryStats<'c>>,
}

pub struct EntryStats<'c> {
    pub entry: &'c CatalogEntry,
    /// `None` when the section heading is absent from the source.
    pub counts: Option<ProblemCounts>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProblemCounts {
    pub problems: usize,
    pub missing_answers: usize,
}

pub fn collect<'c>(catalog: &'c [CatalogEntry], parsed: &ParsedSource<'_>) -> Stats<'c> {
    let index = parsed.section_index();
    let entries = catalog
        .iter()
        .map(|entry| EntryStats {
            entry,
            counts: index.get(entry.id).map(|span| ProblemCounts {
                problems: span.problems.len(),
                missing_answers: span
                    .problems
                    .iter()
                    .filter(|p| parsed.answers.get(p.number).map_or(true, |a| a.trim().is_empty()))
                    .count(),
            }),
        })
        .collect();

    Stats {
        answers_line: parsed.answers_line,
        answers: parsed.answers.len(),
        sections_found: parsed.sections.len(),
        entries,
    }
}

impl Stats<'_> {
    pub fn print(&self) {
        println!("Answers at line: {}", self.answers_line + 1);
        println!("Answers:         {}", self.answers);
        println!("Sections found:  {}", self.sections_found);
        println!();
        for e in &self.entries {
            match &e.counts {
                Some(c) => println!(
                    "{:>5} | {:>4} problems | {:>3} without answer",
                    e.entry.id, c.problems, c.missing_answers
                ),
                None => println!("{:>5} | missing", e.entry.id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SECTIONS;
    use crate::parser::parse_source;
    use crate::parser::tests::{answers_min_line, fixture};

    #[test]
    fn counts_problems_and_missing_answers() {
        let src = fixture();
        let parsed = parse_source(&src, "1.1", answers_min_line(&src)).unwrap();
        let stats = collect(SECTIONS, &parsed);

        assert_eq!(stats.sections_found, 3);
        assert_eq!(stats.answers, 6);
        assert_eq!(stats.entries.len(), SECTIONS.len());

        let by_id = |id: &str| stats.entries.iter().find(|e| e.entry.id == id).unwrap();
        assert_eq!(by_id("1.1").counts, Some(ProblemCounts { problems: 3, missing_answers: 0 }));
        assert_eq!(by_id("2.1").counts, Some(ProblemCounts { problems: 2, missing_answers: 1 }));
        assert_eq!(by_id("6.7").counts, None);
    }
}
