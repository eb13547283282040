// Text Segmenter
// Splits raw text into contiguous, offset-tagged spans for scoring.

use crate::models::Segment;
use regex::Regex;
use std::sync::OnceLock;

/// Chunking boundary policy. Paragraph splitting (runs of newlines) is the
/// default; sentence splitting is a coarser heuristic in the same spirit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SegmentPolicy {
    #[default]
    Paragraph,
    Sentence,
}

impl SegmentPolicy {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "sentence" => Self::Sentence,
            _ => Self::Paragraph,
        }
    }
}

fn paragraph_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n+").unwrap())
}

fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Group 1 ends the sentence (terminal punctuation plus trailing closers),
    // group 2 is the blank run skipped before the next sentence starts.
    RE.get_or_init(|| Regex::new(r#"([.!?。！？…]["'”’)]*)(\s+)"#).unwrap())
}

/// Split `text` into scoreless segments. Blank-only runs are skipped but
/// still advance the offset counter, so offsets always index into `text`.
pub fn segment(text: &str, policy: SegmentPolicy) -> Vec<Segment> {
    let spans = match policy {
        SegmentPolicy::Paragraph => paragraph_spans(text),
        SegmentPolicy::Sentence => sentence_spans(text),
    };

    spans
        .into_iter()
        .map(|(start, end)| Segment {
            text: text[start..end].to_string(),
            score: 0.0,
            start,
            end,
        })
        .collect()
}

fn paragraph_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    for m in paragraph_break_re().find_iter(text) {
        push_span(text, pos, m.start(), &mut spans);
        pos = m.end();
    }
    push_span(text, pos, text.len(), &mut spans);
    spans
}

fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    for caps in sentence_break_re().captures_iter(text) {
        let terminal = caps.get(1).unwrap();
        let blank = caps.get(2).unwrap();
        push_span(text, pos, terminal.end(), &mut spans);
        pos = blank.end();
    }
    push_span(text, pos, text.len(), &mut spans);
    spans
}

fn push_span(text: &str, start: usize, end: usize, out: &mut Vec<(usize, usize)>) {
    if start < end && !text[start..end].trim().is_empty() {
        out.push((start, end));
    }
}
