use crate::scope::errors::ScopeError;
use crate::scope::LineRange;
use std::str::FromStr;

/// `--lines START:END`, 1-indexed; either side may be empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSpec {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl LineSpec {
    /// Resolve to 0-indexed `[START-1, END)`, clamped to the file.
    pub fn resolve(&self, total: usize) -> LineRange {
        let start = self.start.map_or(0, |s| s.saturating_sub(1)).min(total);
        let end = self.end.unwrap_or(total).min(total);
        LineRange::new(start, end)
    }
}

impl FromStr for LineSpec {
    type Err = ScopeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (start, end) = split_pair(input)?;
        let parse = |value: &str| -> Result<Option<usize>, ScopeError> {
            if value.is_empty() {
                return Ok(None);
            }
            value
                .parse::<usize>()
                .map(Some)
                .map_err(|_| ScopeError::InvalidLineNumber {
                    input: input.to_string(),
                    value: value.to_string(),
                })
        };
        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

/// `--fraction A:B`, each side a percentage (`25%`) or decimal (`0.25`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionSpec {
    pub start: f64,
    pub end: f64,
}

impl Default for FractionSpec {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
        }
    }
}

impl FractionSpec {
    /// Resolve to line indices by truncating `fraction * total`.
    pub fn resolve(&self, total: usize) -> LineRange {
        LineRange::new(to_line(self.start, total), to_line(self.end, total))
    }
}

fn to_line(fraction: f64, total: usize) -> usize {
    // epsilon absorbs binary rounding, e.g. 0.29 * 100 = 28.999...
    let line = (fraction * total as f64 + 1e-9).floor();
    (line as usize).min(total)
}

impl FromStr for FractionSpec {
    type Err = ScopeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (start, end) = split_pair(input)?;
        let parse = |value: &str, default: f64| -> Result<f64, ScopeError> {
            if value.is_empty() {
                return Ok(default);
            }
            let invalid = || ScopeError::InvalidFraction {
                input: input.to_string(),
                value: value.to_string(),
            };
            let fraction = match value.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f64>().map_err(|_| invalid())? / 100.0,
                None => value.parse::<f64>().map_err(|_| invalid())?,
            };
            if !fraction.is_finite() {
                return Err(invalid());
            }
            Ok(fraction.clamp(0.0, 1.0))
        };
        Ok(Self {
            start: parse(start, 0.0)?,
            end: parse(end, 1.0)?,
        })
    }
}

fn split_pair(input: &str) -> Result<(&str, &str), ScopeError> {
    input
        .split_once(':')
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| ScopeError::MissingSeparator {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_spec_parse() {
        assert_eq!(
            "10:20".parse::<LineSpec>().unwrap(),
            LineSpec {
                start: Some(10),
                end: Some(20)
            }
        );
        assert_eq!(":5".parse::<LineSpec>().unwrap().start, None);
        assert_eq!("5:".parse::<LineSpec>().unwrap().end, None);
        assert_eq!(":".parse::<LineSpec>().unwrap(), LineSpec::default());
    }

    #[test]
    fn test_line_spec_errors() {
        assert!(matches!(
            "10".parse::<LineSpec>(),
            Err(ScopeError::MissingSeparator { .. })
        ));
        assert!(matches!(
            "a:3".parse::<LineSpec>(),
            Err(ScopeError::InvalidLineNumber { ref value, .. }) if value == "a"
        ));
        assert!(matches!(
            "1:2:3".parse::<LineSpec>(),
            Err(ScopeError::InvalidLineNumber { ref value, .. }) if value == "2:3"
        ));
        assert!(matches!(
            "-1:3".parse::<LineSpec>(),
            Err(ScopeError::InvalidLineNumber { .. })
        ));
    }

    #[test]
    fn test_line_spec_resolve_clamps() {
        let spec: LineSpec = "3:7".parse().unwrap();
        assert_eq!(spec.resolve(100), LineRange::new(2, 7));
        assert_eq!(spec.resolve(5), LineRange::new(2, 5));
        assert!(spec.resolve(2).is_empty());

        let spec: LineSpec = "0:".parse().unwrap();
        assert_eq!(spec.resolve(10), LineRange::new(0, 10));
    }

    #[test]
    fn test_fraction_parse() {
        let spec: FractionSpec = "25%:0.5".parse().unwrap();
        assert_eq!(spec.start, 0.25);
        assert_eq!(spec.end, 0.5);

        let spec: FractionSpec = ":".parse().unwrap();
        assert_eq!(spec, FractionSpec::default());

        let spec: FractionSpec = "-1:150%".parse().unwrap();
        assert_eq!(spec, FractionSpec::default());
    }

    #[test]
    fn test_fraction_errors() {
        assert!(matches!(
            "half:1".parse::<FractionSpec>(),
            Err(ScopeError::InvalidFraction { .. })
        ));
        assert!(matches!(
            "0:NaN".parse::<FractionSpec>(),
            Err(ScopeError::InvalidFraction { .. })
        ));
        assert!(matches!(
            "0.5".parse::<FractionSpec>(),
            Err(ScopeError::MissingSeparator { .. })
        ));
    }

    #[test]
    fn test_fraction_matches_line_spec() {
        let fraction: FractionSpec = "0:0.5".parse().unwrap();
        let lines: LineSpec = "1:8".parse().unwrap();
        assert_eq!(fraction.resolve(16), lines.resolve(16));
    }

    #[test]
    fn test_fraction_truncates() {
        let spec: FractionSpec = "29%:0.7".parse().unwrap();
        assert_eq!(spec.resolve(100), LineRange::new(29, 70));
        let spec: FractionSpec = "0.1:0.2".parse().unwrap();
        assert_eq!(spec.resolve(7), LineRange::new(0, 1));
    }
}
