//! better-varchar: collapse verbose Pro*C `VARCHAR` idioms into VSuite macros
//!
//! A purely textual source-to-source rewriter. A small, ordered library of
//! regex rules recognises statement shapes such as
//!
//! ```c
//! strcpy(dst.arr, src.arr);
//! dst.arr[src.len] = '\0';
//! ```
//!
//! and replaces them with the equivalent macro call (`v_copy(dst, src);`).
//!
//! # Architecture
//!
//! - [`rules`]: the pattern library, one [`Rule`] per idiom, compiled once.
//! - [`pipeline`]: runs the rules in canonical order, reporting each firing
//!   to a pluggable [`MatchSink`].
//! - [`scope`]: narrows the file to line ranges, fractions or function bodies.
//! - [`driver`]: reads the file, rewrites each selected range in place and
//!   writes the result atomically.
//!
//! There is no C parser behind any of this; code that does not match the
//! expected shapes exactly is left alone.
//!
//! # Example
//!
//! ```
//! use better_varchar::transform;
//!
//! let out = transform("strcpy(foo.arr, \"hi\");", None);
//! assert_eq!(out, "vp_copy(foo, \"hi\");");
//! ```

pub mod driver;
pub mod pipeline;
pub mod rules;
pub mod scope;

// Re-exports
pub use driver::{rewrite_ranges, split_lines, Driver, DriverError, Rewrite};
pub use pipeline::{transform, MatchRecord, MatchSink, NullSink, Pipeline, ShowFilter};
pub use rules::{rule, rules, Rule, RuleError, RuleName, RuleSet};
pub use scope::{FractionSpec, LineRange, LineSpec, Scope, ScopeError};
