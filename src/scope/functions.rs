//! Brace-counting locator for named function bodies.
//!
//! Braces inside string literals or comments are counted like any other
//! brace.

use crate::scope::LineRange;
use regex::Regex;

/// Locate the body of `name` in `lines`.
///
/// Starts at the first line where `name` appears word-bounded and followed by
/// `(`. A line with a `;` before any `{` is a prototype or a call, so the
/// search moves on. From the chosen line, `{`/`}` are counted until the depth
/// returns to zero; the span runs to the line after the closing brace, or to
/// end of file when the body never closes.
pub fn function_span(lines: &[&str], name: &str) -> Option<LineRange> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let pattern = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))).ok()?;

    let mut from = 0;
    while let Some(offset) = lines[from..].iter().position(|line| pattern.is_match(line)) {
        let start = from + offset;
        match brace_extent(lines, start) {
            Extent::Statement => from = start + 1,
            Extent::Closed(end) => return Some(LineRange::new(start, end)),
            Extent::Unclosed => return Some(LineRange::new(start, lines.len())),
        }
    }
    None
}

/// Spans for every name that was found, in file order, overlaps merged.
pub fn function_spans<S: AsRef<str>>(lines: &[&str], names: &[S]) -> Vec<LineRange> {
    let mut spans: Vec<LineRange> = names
        .iter()
        .filter_map(|name| function_span(lines, name.as_ref()))
        .collect();
    spans.sort_by_key(|span| (span.start, span.end));

    let mut merged: Vec<LineRange> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

enum Extent {
    /// Ended by `;` before any brace opened
    Statement,
    /// Exclusive end line
    Closed(usize),
    Unclosed,
}

fn brace_extent(lines: &[&str], start: usize) -> Extent {
    let mut depth: i64 = 0;
    let mut opened = false;
    for (idx, line) in lines.iter().enumerate().skip(start) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                ';' if idx == start && !opened => return Extent::Statement,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return Extent::Closed(idx + 1);
        }
    }
    Extent::Unclosed
}
