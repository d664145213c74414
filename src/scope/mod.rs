//! Range selection: which lines of a file the rewrite pipeline may touch.
//!
//! A [`Scope`] combines an optional explicit line range, an optional
//! fraction range and any number of function names into an ordered list of
//! disjoint [`LineRange`]s.

pub mod errors;
pub mod functions;
pub mod spec;

pub use errors::ScopeError;
pub use functions::{function_span, function_spans};
pub use spec::{FractionSpec, LineSpec};

/// Half-open interval `[start, end)` of 0-indexed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn intersect(&self, other: &LineRange) -> LineRange {
        LineRange::new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// Scope constraints for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub lines: Option<LineSpec>,
    pub fraction: Option<FractionSpec>,
    pub functions: Vec<String>,
}

impl Scope {
    /// Scope covering the whole file.
    pub fn whole_file() -> Self {
        Self::default()
    }

    /// Whole file narrowed by the line and fraction specs.
    pub fn outer_bound(&self, total: usize) -> LineRange {
        let mut bound = LineRange::new(0, total);
        if let Some(lines) = &self.lines {
            bound = bound.intersect(&lines.resolve(total));
        }
        if let Some(fraction) = &self.fraction {
            bound = bound.intersect(&fraction.resolve(total));
        }
        bound
    }

    /// Ordered, disjoint, non-empty ranges to transform.
    pub fn select(&self, lines: &[&str]) -> Vec<LineRange> {
        let outer = self.outer_bound(lines.len());

        if self.functions.is_empty() {
            return if outer.is_empty() { vec![] } else { vec![outer] };
        }

        function_spans(lines, &self.functions)
            .into_iter()
            .map(|span| span.intersect(&outer))
            .filter(|span| !span.is_empty())
            .collect()
    }

    /// Requested function names with no body in `lines`.
    pub fn missing_functions(&self, lines: &[&str]) -> Vec<String> {
        self.functions
            .iter()
            .filter(|name| function_span(lines, name).is_none())
            .cloned()
            .collect()
    }
}
