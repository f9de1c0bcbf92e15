use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static ANSWER_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([0-9]+\.[0-9]+)\. ").unwrap());

/// Problem id -> trimmed raw answer text, built once from the answers region.
#[derive(Debug, Default, Clone)]
pub struct AnswerTable<'a> {
    entries: HashMap<&'a str, &'a str>,
}

impl<'a> AnswerTable<'a> {
    /// Each line-start `<major>.<n>. ` marker opens an answer that runs to the
    /// next marker or the end of the region. Later duplicates win.
    pub fn parse(region: &'a str) -> Self {
        let markers: Vec<_> = ANSWER_MARKER_RE
            .captures_iter(region)
            .map(|caps| {
                let whole = caps.get(0).unwrap();
                (caps.get(1).unwrap().as_str(), whole.start(), whole.end())
            })
            .collect();

        let mut entries = HashMap::with_capacity(markers.len());
        for (i, &(id, _, body_start)) in markers.iter().enumerate() {
            let body_end = markers.get(i + 1).map_or(region.len(), |m| m.1);
            entries.insert(id, region[body_start..body_end].trim());
        }

        AnswerTable { entries }
    }

    pub fn get(&self, id: &str) -> Option<&'a str> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
