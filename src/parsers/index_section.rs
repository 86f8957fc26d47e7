//! Line parser for the manual's index section.
//!
//! Accepted line shapes, tried in order:
//!
//! ```text
//! distance, 245, 250, 300-302     comma list (every numeric part contributes)
//! distance ........ 245-247       dot leaders
//! distance p. 245 / distance, pp. 245-247
//! distance 245-247                plain
//! ```
//!
//! Ranges accept `-` or `–`. A line yields one span: the union of all numbers on it.
//!
//! Names may span several words (`atomic fluctuations, 512`). Inner whitespace collapses to
//! one space, and a word made only of digits is never part of a name.

use std::sync::LazyLock;

use regex::Regex;

const NAME: &str = r"[A-Za-z0-9_\\:+\-/.]+(?:\s+[A-Za-z0-9_][A-Za-z0-9_\\:+\-/.]*)*";
const IGNORED_PREFIXES: [&str; 4] = ["see ", "seealso", "…", "index"];

static PAGE_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:pp?\.?\s*)?(\d+)(?:\s*[-–]\s*(\d+))?$").expect("valid page regex")
});

static DOT_LEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({})\s*(?:\.\s*){{3,}}(\d+)(?:\s*[-–]\s*(\d+))?\s*$", NAME))
        .expect("valid dot leader regex")
});

static PAGE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^({})[\s,]+pp?\.\s*(\d+)(?:\s*[-–]\s*(\d+))?\s*$", NAME))
        .expect("valid page prefix regex")
});

static PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({})\s+(\d+)(?:\s*[-–]\s*(\d+))?\s*$", NAME))
        .expect("valid plain regex")
});

/// A command name with the page span found on one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

/// What a single index-section line turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Entry(ParsedLine),
    /// Blank lines, cross references and headings
    Ignored,
    /// Did not match any known shape
    Unrecognized,
    /// Matched a shape but the span is unusable (`end < start` or page 0)
    InvalidSpan { name: String, start: u32, end: u32 },
}

/// Classify one line of the index section
pub fn parse_index_line(raw: &str) -> LineOutcome {
    let line = raw.trim();
    if line.is_empty() {
        return LineOutcome::Ignored;
    }
    let lowered = line.to_lowercase();
    if IGNORED_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
        return LineOutcome::Ignored;
    }

    if line.contains(',')
        && let Some(outcome) = parse_comma_list(line)
    {
        return outcome;
    }

    for pattern in [&*DOT_LEADER, &*PAGE_PREFIX, &*PLAIN] {
        if let Some(caps) = pattern.captures(line) {
            let name = clean_name(&caps[1]);
            let Some(name) = name else { continue };
            let Some(start) = parse_page(&caps[2]) else { continue };
            let end = match caps.get(3) {
                Some(m) => match parse_page(m.as_str()) {
                    Some(end) => end,
                    None => continue,
                },
                None => start,
            };
            return span_outcome(name, vec![(start, end)]);
        }
    }

    LineOutcome::Unrecognized
}

/// `name, 12, 15-17, p. 40`: returns `None` when the line is not a comma list
fn parse_comma_list(line: &str) -> Option<LineOutcome> {
    let mut parts = line.split(',').map(str::trim);
    let name = clean_name(parts.next()?)?;

    let mut spans = Vec::new();
    for part in parts {
        let Some(caps) = PAGE_PART.captures(part) else { continue };
        let Some(start) = parse_page(&caps[1]) else { continue };
        let end = match caps.get(2) {
            Some(m) => match parse_page(m.as_str()) {
                Some(end) => end,
                None => continue,
            },
            None => start,
        };
        spans.push((start, end));
    }

    if spans.is_empty() {
        return None;
    }
    Some(span_outcome(name, spans))
}

fn span_outcome(name: String, spans: Vec<(u32, u32)>) -> LineOutcome {
    if let Some(&(start, end)) = spans.iter().find(|(start, end)| *start == 0 || end < start) {
        return LineOutcome::InvalidSpan { name, start, end };
    }
    // Non-empty by construction
    let start = spans.iter().map(|(s, _)| *s).min().unwrap_or(0);
    let end = spans.iter().map(|(_, e)| *e).max().unwrap_or(0);
    LineOutcome::Entry(ParsedLine { name, start, end })
}

/// Trailing dots belong to leaders. A name needs at least one letter and no bare page numbers.
fn clean_name(raw: &str) -> Option<String> {
    let name = raw.trim().trim_end_matches('.');
    if !name.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.iter().any(|word| word.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    Some(words.join(" "))
}

fn parse_page(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok()
}
