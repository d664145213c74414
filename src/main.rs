use anyhow::Result;
use better_varchar::{
    Driver, FractionSpec, LineSpec, Pipeline, Rewrite, RuleName, RuleSet, Scope, ShowFilter,
};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Value clap fills in for a bare `--show`.
const SHOW_ALL: &str = "all";

const RULES_HELP: &str = "\
Rules, in the order they run:
  setlenz     X.arr[X.len] = '\\0';                    -> VARCHAR_SETLENZ(X);
  v_copy_1    strcpy(D.arr, S.arr); D.arr[S.len] = '\\0'; -> v_copy(D, S);
  v_copy_2    strcpy(D.arr, S.arr);                   -> v_copy(D, S);
  vp_copy     strcpy(D.arr, \"text\");                  -> vp_copy(D, \"text\");
  v_sprintf   sprintf(D.arr, fmt, ...);               -> VARCHAR_sprintf(D, fmt, ...);
  zsetlen     D.len = strlen(S.arr);                  -> VARCHAR_ZSETLEN(D);

Rule names accept '-' for '_' and may be given as --show:NAME or --show=NAME.";

#[derive(Parser)]
#[command(name = "better-varchar")]
#[command(about = "Replace verbose VARCHAR idioms with VSuite macros", long_about = None)]
#[command(version)]
#[command(after_help = RULES_HELP)]
struct Cli {
    /// Pro*C / C source file to rewrite
    input: PathBuf,

    /// Where to write the rewritten source (must be omitted with --show)
    output: Option<PathBuf>,

    /// Only touch lines START:END (1-indexed; either side may be empty)
    #[arg(long, value_name = "START:END")]
    lines: Option<LineSpec>,

    /// Only touch the fraction A:B of the file (0.25 or 25%; either side may be empty)
    #[arg(long, value_name = "A:B")]
    fraction: Option<FractionSpec>,

    /// Only touch the body of this function (repeatable)
    #[arg(long = "function", value_name = "NAME")]
    functions: Vec<String>,

    /// Report rule firings instead of writing output; optionally per rule (repeatable)
    #[arg(
        long,
        value_name = "RULE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = SHOW_ALL
    )]
    show: Vec<String>,

    /// Run only this rule (repeatable)
    #[arg(long, value_name = "RULE", require_equals = true)]
    only: Vec<RuleName>,

    /// Report format for --show
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Print a unified diff of the rewrite
    #[arg(short, long, conflicts_with = "show")]
    diff: bool,

    /// Suppress the summary line
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Aligned `rule  line: text` lines
    Text,
    /// One JSON object per line
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_colon_flags(env::args_os()));

    let show = show_filter(&cli.show);

    let scope = Scope {
        lines: cli.lines,
        fraction: cli.fraction,
        functions: cli.functions.clone(),
    };
    let pipeline = if cli.only.is_empty() {
        Pipeline::new()
    } else {
        Pipeline::with_only(cli.only.iter().copied().collect())
    };
    let driver = Driver::new(scope, pipeline);

    match show {
        Some(filter) => {
            if let Some(output) = &cli.output {
                usage_error(
                    ErrorKind::ArgumentConflict,
                    format!(
                        "the output file '{}' cannot be used with '--show'",
                        output.display()
                    ),
                );
            }
            cmd_show(&driver, &cli.input, &filter, cli.format)
        }
        None => {
            let Some(output) = cli.output.as_deref() else {
                usage_error(
                    ErrorKind::MissingRequiredArgument,
                    "an <OUTPUT> file is required unless '--show' is given",
                );
            };
            cmd_rewrite(&driver, &cli.input, output, cli.diff, cli.quiet)
        }
    }
}

/// Report an invalid invocation the way clap does and exit with status 2.
fn usage_error(kind: ErrorKind, message: impl std::fmt::Display) -> ! {
    Cli::command().error(kind, message).exit()
}

/// Rewrite `--show:RULE` / `--only:RULE` into the `--flag=RULE` form clap parses.
fn normalize_colon_flags<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            let rewritten = arg.to_str().and_then(|text| {
                ["--show", "--only"].into_iter().find_map(|flag| {
                    text.strip_prefix(flag)
                        .and_then(|rest| rest.strip_prefix(':'))
                        .map(|rule| OsString::from(format!("{flag}={rule}")))
                })
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

/// `None` when not in show mode.
fn show_filter(values: &[String]) -> Option<ShowFilter> {
    if values.is_empty() {
        return None;
    }
    if values.iter().any(|value| value == SHOW_ALL) {
        return Some(ShowFilter::All);
    }
    let mut rules = RuleSet::new();
    for value in values {
        match value.parse::<RuleName>() {
            Ok(rule) => {
                rules.insert(rule);
            }
            Err(err) => usage_error(ErrorKind::InvalidValue, err),
        }
    }
    Some(ShowFilter::Rules(rules))
}

fn note_missing_functions(rewrite: &Rewrite) {
    for name in &rewrite.missing_functions {
        eprintln!(
            "{}",
            format!("Note: function '{}' not found; nothing selected for it", name).dimmed()
        );
    }
}

fn cmd_show(driver: &Driver, input: &Path, filter: &ShowFilter, format: ReportFormat) -> Result<()> {
    let rewrite = driver.run(input, None)?;
    note_missing_functions(&rewrite);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in rewrite.records.iter().filter(|r| filter.accepts(r.rule)) {
        match format {
            ReportFormat::Text => writeln!(out, "{record}")?,
            ReportFormat::Json => writeln!(out, "{}", serde_json::to_string(record)?)?,
        }
    }
    out.flush()?;

    Ok(())
}

fn cmd_rewrite(
    driver: &Driver,
    input: &Path,
    output: &Path,
    show_diff: bool,
    quiet: bool,
) -> Result<()> {
    let rewrite = driver.run(input, Some(output))?;
    note_missing_functions(&rewrite);

    if show_diff && rewrite.changed() {
        display_diff(input, output, &rewrite.original, &rewrite.rewritten);
    }

    if quiet {
        return Ok(());
    }

    if rewrite.ranges.is_empty() {
        eprintln!(
            "{}",
            format!(
                "Warning: no lines selected; {} is an unchanged copy of {}",
                output.display(),
                input.display()
            )
            .yellow()
        );
    }

    println!(
        "{} {} rewrite(s) in {} range(s) written to {}",
        "✓".green(),
        rewrite.records.len(),
        rewrite.ranges.len(),
        output.display()
    );

    Ok(())
}

/// Helper: Show unified diff between original and rewritten content
fn display_diff(input: &Path, output: &Path, original: &str, rewritten: &str) {
    println!("{}", format!("--- {}", input.display()).dimmed());
    println!("{}", format!("+++ {}", output.display()).dimmed());

    let diff = TextDiff::from_lines(original, rewritten);

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!("{}", "...".dimmed());
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => format!("-{}", change).red(),
                    ChangeTag::Insert => format!("+{}", change).green(),
                    ChangeTag::Equal => format!(" {}", change).normal(),
                };
                print!("{}", sign);
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_normalize_colon_flags() {
        let args = normalize_colon_flags(os(&[
            "better-varchar",
            "--show:v-copy-1",
            "--only:zsetlen",
            "--show",
            "in.pc",
        ]));
        assert_eq!(
            args,
            os(&[
                "better-varchar",
                "--show=v-copy-1",
                "--only=zsetlen",
                "--show",
                "in.pc"
            ])
        );
    }

    #[test]
    fn test_normalize_stops_at_double_dash() {
        let args = normalize_colon_flags(os(&["better-varchar", "--", "--show:x"]));
        assert_eq!(args, os(&["better-varchar", "--", "--show:x"]));
    }

    #[test]
    fn test_parse_show_and_only() {
        let cli = Cli::parse_from(normalize_colon_flags(os(&[
            "better-varchar",
            "--show",
            "--show:vp-copy",
            "--only:v_copy_2",
            "--only=setlenz",
            "in.pc",
        ])));
        assert_eq!(cli.show, vec![SHOW_ALL.to_string(), "vp-copy".to_string()]);
        assert_eq!(cli.only, vec![RuleName::VCopy2, RuleName::Setlenz]);
        assert_eq!(cli.input, PathBuf::from("in.pc"));
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_parse_ranges() {
        let cli = Cli::parse_from([
            "better-varchar",
            "--lines",
            "3:",
            "--fraction",
            "10%:0.9",
            "--function",
            "main",
            "--function",
            "load",
            "in.pc",
            "out.pc",
        ]);
        assert_eq!(cli.lines.unwrap().start, Some(3));
        assert_eq!(cli.fraction.unwrap().end, 0.9);
        assert_eq!(cli.functions, vec!["main", "load"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.pc")));
    }

    #[test]
    fn test_parse_rejects_bad_range() {
        let result = Cli::try_parse_from(["better-varchar", "--lines", "abc", "in.pc", "out.pc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_only_rule() {
        let result = Cli::try_parse_from(["better-varchar", "--only=bogus", "in.pc", "out.pc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_diff_conflicts_with_show() {
        let result = Cli::try_parse_from(["better-varchar", "--show", "--diff", "in.pc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_filter() {
        assert_eq!(show_filter(&[]), None);
        assert_eq!(
            show_filter(&["zsetlen".to_string(), SHOW_ALL.to_string()]),
            Some(ShowFilter::All)
        );
        assert_eq!(
            show_filter(&["v-sprintf".to_string()]),
            Some(ShowFilter::Rules(
                [RuleName::VSprintf].into_iter().collect()
            ))
        );
    }
}
