use crate::pipeline::{MatchRecord, MatchSink, Pipeline};
use crate::scope::{LineRange, Scope};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
}

/// Outcome of rewriting one file.
#[derive(Debug, Clone)]
#[must_use = "Rewrite carries the records and the rewritten text"]
pub struct Rewrite {
    pub original: String,
    pub rewritten: String,
    /// Ranges the pipeline ran over, in file order
    pub ranges: Vec<LineRange>,
    /// Every rule firing, in the order rules ran per range
    pub records: Vec<MatchRecord>,
    /// Requested functions that were not found
    pub missing_functions: Vec<String>,
}

impl Rewrite {
    pub fn changed(&self) -> bool {
        self.original != self.rewritten
    }
}

/// Split keeping line terminators, so concatenation is byte-exact.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Rewrite every selected range of `source` in place.
///
/// Text outside the ranges is copied through untouched. Ranges must be
/// sorted and disjoint, which [`Scope::select`] guarantees.
pub fn rewrite_ranges(
    source: &str,
    ranges: &[LineRange],
    pipeline: &Pipeline,
    sink: &mut dyn MatchSink,
) -> String {
    let lines = split_lines(source);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for range in ranges {
        let start = range.start.clamp(cursor, lines.len());
        let end = range.end.min(lines.len());
        if start >= end {
            continue;
        }
        out.extend(lines[cursor..start].iter().copied());
        let segment = lines[start..end].concat();
        out.push_str(&pipeline.run(&segment, start, sink));
        cursor = end;
    }

    out.extend(lines[cursor..].iter().copied());
    out
}

/// Reads, rewrites and (optionally) writes a single file.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    scope: Scope,
    pipeline: Pipeline,
}

impl Driver {
    pub fn new(scope: Scope, pipeline: Pipeline) -> Self {
        Self { scope, pipeline }
    }

    /// Rewrite already-loaded source text.
    pub fn rewrite_source(&self, source: &str) -> Rewrite {
        let lines = split_lines(source);
        let ranges = self.scope.select(&lines);
        let missing_functions = self.scope.missing_functions(&lines);

        let mut records = Vec::new();
        let rewritten = rewrite_ranges(source, &ranges, &self.pipeline, &mut records);

        Rewrite {
            original: source.to_string(),
            rewritten,
            ranges,
            records,
            missing_functions,
        }
    }

    /// Rewrite `input`. With `output`, the result replaces that file
    /// atomically; without it nothing is written (show mode).
    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<Rewrite, DriverError> {
        let source = read_source(input)?;
        let rewrite = self.rewrite_source(&source);

        if let Some(output) = output {
            atomic_write(output, rewrite.rewritten.as_bytes()).map_err(|source| {
                DriverError::Write {
                    path: output.to_path_buf(),
                    source,
                }
            })?;
        }

        Ok(rewrite)
    }
}

pub fn read_source(path: &Path) -> Result<String, DriverError> {
    let bytes = fs::read(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| DriverError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full output lands or the destination is left as it was.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
