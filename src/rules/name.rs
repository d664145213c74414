use crate::rules::errors::RuleError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a rewrite rule.
///
/// Variants are declared in canonical pipeline order, so the derived `Ord`
/// doubles as execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RuleName {
    #[serde(rename = "setlenz")]
    Setlenz,
    #[serde(rename = "v_copy_1")]
    VCopy1,
    #[serde(rename = "v_copy_2")]
    VCopy2,
    #[serde(rename = "vp_copy")]
    VpCopy,
    #[serde(rename = "v_sprintf")]
    VSprintf,
    #[serde(rename = "zsetlen")]
    Zsetlen,
}

impl RuleName {
    pub const ALL: [RuleName; 6] = [
        RuleName::Setlenz,
        RuleName::VCopy1,
        RuleName::VCopy2,
        RuleName::VpCopy,
        RuleName::VSprintf,
        RuleName::Zsetlen,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleName::Setlenz => "setlenz",
            RuleName::VCopy1 => "v_copy_1",
            RuleName::VCopy2 => "v_copy_2",
            RuleName::VpCopy => "vp_copy",
            RuleName::VSprintf => "v_sprintf",
            RuleName::Zsetlen => "zsetlen",
        }
    }

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width/alignment flags apply to the name
        f.pad(self.as_str())
    }
}

impl FromStr for RuleName {
    type Err = RuleError;

    /// Hyphens and underscores are interchangeable: `v-copy-1` == `v_copy_1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        RuleName::ALL
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| RuleError::UnknownRule {
                name: s.to_string(),
                expected: RuleName::ALL
                    .iter()
                    .map(|name| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A set of rule names that always iterates in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet(BTreeSet<RuleName>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        RuleName::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, name: RuleName) -> bool {
        self.0.insert(name)
    }

    pub fn contains(&self, name: RuleName) -> bool {
        self.0.contains(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RuleName> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<RuleName> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RuleName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
