//! The pattern library: fixed, ordered textual rewrite rules for VARCHAR idioms.
//!
//! Each rule pairs a line-anchored regex with an emitter. Rules are ordered
//! most specific first; the `v_copy_1` shape (copy plus terminator) has to
//! run before `v_copy_2` (copy alone) so the terminator is consumed with it.

pub mod errors;
pub mod library;
pub mod name;

pub use errors::RuleError;
pub use library::{rule, rules, Rule};
pub use name::{RuleName, RuleSet};
