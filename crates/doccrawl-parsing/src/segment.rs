use regex::Regex;

/// Byte range of one article inside an issue document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Number written in the article marker, when it parses.
    pub label: Option<u32>,
}

impl Span {
    pub fn text<'a>(&self, document: &'a str) -> &'a str {
        &document[self.start..self.end]
    }
}

/// Splits an issue document at article boundary markers.
///
/// A span starts at the marker's `marker` group when the pattern has one
/// (so leading indentation or a closing `>` stays in the previous span),
/// otherwise at the whole match. The label comes from `number` or group 1.
/// Spans are non-overlapping, in document order, and each runs from its
/// marker to the next marker (or end of document). Text before the first
/// marker is the preamble, where issue-level fields live.
#[derive(Debug, Clone, Copy)]
pub struct IssueSegmenter<'c> {
    marker: &'c Regex,
}

impl<'c> IssueSegmenter<'c> {
    pub fn new(marker: &'c Regex) -> Self {
        Self { marker }
    }

    pub fn spans(&self, document: &str) -> Vec<Span> {
        let markers: Vec<(usize, Option<u32>)> = self
            .marker
            .captures_iter(document)
            .filter_map(|caps| {
                let m = caps.name("marker").or_else(|| caps.get(0))?;
                let label = caps
                    .name("number")
                    .or_else(|| caps.get(1))
                    .and_then(|n| n.as_str().parse().ok());
                Some((m.start(), label))
            })
            .collect();

        markers
            .iter()
            .enumerate()
            .map(|(i, &(start, label))| Span {
                start,
                end: markers
                    .get(i + 1)
                    .map_or(document.len(), |&(next, _)| next),
                label,
            })
            .collect()
    }

    pub fn preamble<'a>(&self, document: &'a str) -> &'a str {
        match self.spans(document).first() {
            Some(span) => &document[..span.start],
            None => document,
        }
    }
}
