use crate::rules::{rules, Rule, RuleName, RuleSet};
use serde::Serialize;
use std::fmt;

/// A single rule firing, reported to a [`MatchSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub rule: RuleName,
    /// 1-indexed line in the full file
    pub line: usize,
    /// Exact matched text, before substitution
    pub text: String,
}

impl fmt::Display for MatchRecord {
    /// `   v_copy_1    12: strcpy(a.arr, b.arr);\na.arr[b.len] = '\0';`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} {:>5}: {}",
            self.rule,
            self.line,
            self.text.replace('\n', "\\n")
        )
    }
}

/// Receiver for diagnostic records produced while the pipeline runs.
pub trait MatchSink {
    fn record(&mut self, record: MatchRecord);
}

impl MatchSink for Vec<MatchRecord> {
    fn record(&mut self, record: MatchRecord) {
        self.push(record);
    }
}

/// Sink that drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MatchSink for NullSink {
    fn record(&mut self, _record: MatchRecord) {}
}

/// Which rule firings a diagnostic report includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowFilter {
    All,
    Rules(RuleSet),
}

impl ShowFilter {
    pub fn accepts(&self, rule: RuleName) -> bool {
        match self {
            ShowFilter::All => true,
            ShowFilter::Rules(set) => set.contains(rule),
        }
    }
}

/// Ordered application of the pattern library over a text buffer.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    only: Option<RuleSet>,
}

impl Pipeline {
    /// Pipeline running every rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline running only `only`, still in canonical order.
    pub fn with_only(only: RuleSet) -> Self {
        Self { only: Some(only) }
    }

    /// Rules this pipeline will execute, in order.
    pub fn enabled(&self) -> impl Iterator<Item = &'static Rule> + '_ {
        rules().iter().filter(move |rule| match &self.only {
            Some(only) => only.contains(rule.name),
            None => true,
        })
    }

    /// Rewrite `text`, reporting every firing to `sink`.
    ///
    /// `base_line` is the 0-indexed line of `text`'s first line within the
    /// full file. Each rule sees the previous rule's output; record line
    /// numbers are mapped back onto `text` as it was handed in.
    pub fn run(&self, text: &str, base_line: usize, sink: &mut dyn MatchSink) -> String {
        let mut current = text.to_string();
        let mut origins = LineMap::identity(text);
        for rule in self.enabled() {
            let mut edits = Vec::new();
            let rewritten = rule.apply(&current, |start, matched, replacement| {
                let line = current[..start].matches('\n').count();
                sink.record(MatchRecord {
                    rule: rule.name,
                    line: base_line + 1 + origins.origin(line),
                    text: matched.to_string(),
                });
                edits.push(LineEdit {
                    line,
                    removed: matched.matches('\n').count(),
                    inserted: replacement.matches('\n').count(),
                });
            });
            if !edits.is_empty() {
                origins = origins.remap(&edits);
            }
            current = rewritten.into_owned();
        }
        current
    }
}

/// Newline bookkeeping for one rule firing: `removed + 1` lines starting
/// at `line` became `inserted + 1` lines.
#[derive(Debug, Clone, Copy)]
struct LineEdit {
    line: usize,
    removed: usize,
    inserted: usize,
}

/// Maps each line of the working text to its line in the pipeline input.
#[derive(Debug, Clone)]
struct LineMap(Vec<usize>);

impl LineMap {
    fn identity(text: &str) -> Self {
        Self((0..=text.matches('\n').count()).collect())
    }

    fn origin(&self, line: usize) -> usize {
        self.0.get(line).copied().unwrap_or(line)
    }

    /// Apply edits, which must be sorted by line and non-overlapping.
    fn remap(&self, edits: &[LineEdit]) -> Self {
        let mut out = Vec::with_capacity(self.0.len());
        let mut cursor = 0;
        for edit in edits {
            if edit.line < cursor {
                continue;
            }
            out.extend((cursor..edit.line).map(|i| self.origin(i)));
            // collapsed lines keep the origins of the span's leading lines
            out.extend((0..=edit.inserted).map(|k| self.origin(edit.line + k.min(edit.removed))));
            cursor = edit.line + edit.removed + 1;
        }
        out.extend((cursor..self.0.len()).map(|i| self.origin(i)));
        Self(out)
    }
}

/// Run the pipeline over `text` without diagnostics.
pub fn transform(text: &str, only: Option<&RuleSet>) -> String {
    let pipeline = match only {
        Some(only) => Pipeline::with_only(only.clone()),
        None => Pipeline::new(),
    };
    pipeline.run(text, 0, &mut NullSink)
}
