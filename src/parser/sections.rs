use std::collections::HashMap;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use tracing::warn;

use crate::error::Result;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\subsection\*\{([0-9]+\.[0-9]+)\. ([^}]+)\}").unwrap());

#[derive(Debug, Clone)]
pub struct SectionSpan<'a> {
    pub id: &'a str,
    /// Heading as written in the source, e.g. "1.1. Kinematics".
    pub heading: String,
    /// From the heading up to the first problem marker.
    pub intro: &'a str,
    pub problems: Vec<ProblemSpan<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProblemSpan<'a> {
    pub number: &'a str,
    pub statement: &'a str,
}

/// Cut the problems region into sections at each `\subsection*{N.M. Title}`
/// heading, then each section into problems.
pub fn split_sections(region: &str) -> Result<Vec<SectionSpan<'_>>> {
    let headings: Vec<_> = HEADING_RE
        .captures_iter(region)
        .map(|caps| {
            let id = caps.get(1).unwrap().as_str();
            (id, format!("{}. {}", id, &caps[2]), caps.get(0).unwrap().start())
        })
        .collect();

    let mut markers = ProblemMarkers::default();
    let mut sections = Vec::with_capacity(headings.len());

    for (i, &(id, ref heading, start)) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map_or(region.len(), |h| h.2);
        let raw = &region[start..end];
        let major = id.split('.').next().unwrap_or(id);
        let (intro, problems) = split_problems(raw, markers.for_major(major)?);

        for dup in problems.iter().map(|p| p.number).duplicates() {
            warn!(section = id, problem = dup, "duplicate problem number in section");
        }

        sections.push(SectionSpan {
            id,
            heading: heading.clone(),
            intro,
            problems,
        });
    }

    Ok(sections)
}

/// Problems start at line-start `<major>.<n>.` followed by whitespace; the
/// statement begins after that whitespace run.
fn split_problems<'a>(raw: &'a str, marker: &Regex) -> (&'a str, Vec<ProblemSpan<'a>>) {
    let found: Vec<_> = marker
        .captures_iter(raw)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            (caps.get(1).unwrap().as_str(), whole.start(), whole.end())
        })
        .collect();

    let intro = found.first().map_or(raw, |m| &raw[..m.1]);
    let problems = found
        .iter()
        .enumerate()
        .map(|(i, &(number, _, body_start))| {
            let body_end = found.get(i + 1).map_or(raw.len(), |m| m.1);
            ProblemSpan {
                number,
                statement: &raw[body_start..body_end],
            }
        })
        .collect();

    (intro, problems)
}

/// Compiled problem-marker patterns, one per part number.
#[derive(Default)]
struct ProblemMarkers {
    by_major: HashMap<String, Regex>,
}

impl ProblemMarkers {
    fn for_major(&mut self, major: &str) -> Result<&Regex> {
        if !self.by_major.contains_key(major) {
            let re = Regex::new(&format!(r"(?m)^({}\.[0-9]+)\.\s+", regex::escape(major)))?;
            self.by_major.insert(major.to_string(), re);
        }
        Ok(&self.by_major[major])
    }
}

/// Sections by id; when a heading repeats, the later section wins.
pub fn index_by_id<'s, 'a>(sections: &'s [SectionSpan<'a>]) -> HashMap<&'a str, &'s SectionSpan<'a>> {
    sections.iter().map(|s| (s.id, s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: &str = "\\section*{Part One}\n\
\\subsection*{1.1. Kinematics}\n\
Intro line.\n\
1.1. Find velocity.\n\
1.2. A car moves\n\
along 1.3. a road.\n\
\\subsection*{1.2. The Fundamental Equation of Dynamics}\n\
1.3. A block.\n\
2.4. not a marker here\n\
\\subsection*{2.1. Equation of the Gas State. Processes}\n\
2.1. A gas.";

    #[test]
    fn finds_sections_in_order() {
        let s = split_sections(REGION).unwrap();
        let ids: Vec<_> = s.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["1.1", "1.2", "2.1"]);
        assert_eq!(s[1].heading, "1.2. The Fundamental Equation of Dynamics");
    }

    #[test]
    fn intro_runs_from_heading_to_first_problem() {
        let s = split_sections(REGION).unwrap();
        assert_eq!(s[0].intro, "\\subsection*{1.1. Kinematics}\nIntro line.\n");
    }

    #[test]
    fn problems_split_on_line_start_markers() {
        let s = split_sections(REGION).unwrap();
        let p = &s[0].problems;
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].number, "1.1");
        assert_eq!(p[0].statement, "Find velocity.\n");
        assert_eq!(p[1].number, "1.2");
        assert_eq!(p[1].statement, "A car moves\nalong 1.3. a road.\n");
    }

    #[test]
    fn other_part_numbers_are_not_markers() {
        let s = split_sections(REGION).unwrap();
        assert_eq!(s[1].problems.len(), 1);
        assert_eq!(s[1].problems[0].statement, "A block.\n2.4. not a marker here\n");
    }

    #[test]
    fn last_section_runs_to_region_end() {
        let s = split_sections(REGION).unwrap();
        assert_eq!(s[2].problems[0].statement, "A gas.");
    }

    #[test]
    fn section_without_problems_is_all_intro() {
        let s = split_sections("\\subsection*{3.1. Field}\nOnly words.").unwrap();
        assert!(s[0].problems.is_empty());
        assert_eq!(s[0].intro, "\\subsection*{3.1. Field}\nOnly words.");
    }

    #[test]
    fn duplicates_are_kept() {
        let s = split_sections("\\subsection*{1.1. K}\n1.1. a\n1.1. b").unwrap();
        assert_eq!(s[0].problems.len(), 2);
    }

    #[test]
    fn later_heading_wins_lookup() {
        let s = split_sections("\\subsection*{1.1. A}\n1.1. a\n\\subsection*{1.1. B}\n1.2. b").unwrap();
        let idx = index_by_id(&s);
        assert_eq!(idx["1.1"].heading, "1.1. B");
    }
}
