use crate::rules::name::RuleName;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Loose C lvalue: identifier chars plus member (`.`, `->`) and index (`[]`)
/// access, so `foo->bar[0]` is taken as a single variable.
const VAR: &str = r"[A-Za-z0-9_.\->\[\]]+";

/// Optional redundant `(char *)` cast in front of a buffer argument.
const CAST: &str = r"(?:\(\s*char\s*\*\s*\)\s*)?";

/// The four characters `'\0'`.
const NUL: &str = r"'\\0'";

type Emitter = fn(&Captures<'_>) -> Option<String>;

/// One entry of the pattern library.
///
/// The recognizer is a line-anchored regex; the emitter turns its captures
/// into the replacement text. Shapes that need two captures to agree (the
/// regex engine has no backreferences) check that in the emitter and return
/// `None`, which leaves the matched text untouched.
pub struct Rule {
    pub name: RuleName,
    /// Macro the rule emits, for help output.
    pub emits: &'static str,
    regex: Regex,
    emit: Emitter,
}

impl Rule {
    fn new(name: RuleName, emits: &'static str, pattern: &str, emit: Emitter) -> Self {
        #[allow(clippy::expect_used)] // static patterns, covered by tests
        let regex = Regex::new(pattern).expect("built-in rule pattern must compile");
        Self {
            name,
            emits,
            regex,
            emit,
        }
    }

    /// Rewrite every firing of this rule in `text`.
    ///
    /// `on_fire` receives the byte offset in `text`, the matched text and the
    /// replacement of each firing.
    pub fn apply<'t>(
        &self,
        text: &'t str,
        mut on_fire: impl FnMut(usize, &str, &str),
    ) -> Cow<'t, str> {
        self.regex.replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map(|m| (m.start(), m.as_str()));
            match ((self.emit)(caps), whole) {
                (Some(replacement), Some((start, matched))) => {
                    on_fire(start, matched, &replacement);
                    replacement
                }
                (_, whole) => whole.map(|(_, m)| m.to_string()).unwrap_or_default(),
            }
        })
    }

    /// Whether the rule would fire anywhere in `text`.
    pub fn fires_on(&self, text: &str) -> bool {
        self.regex
            .captures_iter(text)
            .any(|caps| (self.emit)(&caps).is_some())
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("emits", &self.emits)
            .finish_non_exhaustive()
    }
}

/// The pattern library in canonical order, compiled once per process.
pub fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            // FOO.arr[FOO.len] = '\0';
            Rule::new(
                RuleName::Setlenz,
                "VARCHAR_SETLENZ",
                &format!(
                    r"(?m)^(?P<indent>[ \t]*)(?P<var>{VAR})\.arr\[\s*(?P<idx>{VAR})\.len\s*\]\s*=\s*{NUL}\s*;"
                ),
                emit_setlenz,
            ),
            // strcpy(FOO.arr, BAR.arr); FOO.arr[BAR.len] = '\0';
            Rule::new(
                RuleName::VCopy1,
                "v_copy",
                &format!(
                    r"(?m)^(?P<indent>[ \t]*)strcpy\(\s*{CAST}(?P<dst>{VAR})\.arr\s*,\s*{CAST}(?P<src>{VAR})\.arr\s*\)\s*;[ \t]*(?:\r?\n[ \t]*)?(?P<dst2>{VAR})\.arr\[\s*(?P<src2>{VAR})\.len\s*\]\s*=\s*{NUL}\s*;"
                ),
                emit_v_copy_terminated,
            ),
            // strcpy(FOO.arr, BAR.arr);
            Rule::new(
                RuleName::VCopy2,
                "v_copy",
                &format!(
                    r"(?m)^(?P<indent>[ \t]*)strcpy\(\s*{CAST}(?P<dst>{VAR})\.arr\s*,\s*{CAST}(?P<src>{VAR})\.arr\s*\)\s*;"
                ),
                emit_v_copy,
            ),
            // strcpy(FOO.arr, "literal");
            Rule::new(
                RuleName::VpCopy,
                "vp_copy",
                &format!(
                    r#"(?m)^(?P<indent>[ \t]*)strcpy\(\s*{CAST}(?P<dst>{VAR})\.arr\s*,\s*(?P<lit>"(?:[^"\\\n]|\\.)*")\s*\)\s*;"#
                ),
                emit_vp_copy,
            ),
            // sprintf(FOO.arr, fmt, ...);
            Rule::new(
                RuleName::VSprintf,
                "VARCHAR_sprintf",
                &format!(
                    r"(?m)^(?P<indent>[ \t]*)sprintf\(\s*{CAST}(?P<dst>{VAR})\.arr\s*,\s*(?P<args>[^;]*?)\s*\)\s*;"
                ),
                emit_v_sprintf,
            ),
            // FOO.len = strlen(BAR.arr);
            Rule::new(
                RuleName::Zsetlen,
                "VARCHAR_ZSETLEN",
                &format!(
                    r"(?m)^(?P<indent>[ \t]*)(?P<dst>{VAR})\.len\s*=\s*(?:\(\s*(?:unsigned\s+)?(?:short|int|long|size_t)\s*\)\s*)?strlen\(\s*{CAST}(?P<src>{VAR})\.arr\s*\)\s*;"
                ),
                emit_zsetlen,
            ),
        ]
    })
}

/// Look up a single rule.
pub fn rule(name: RuleName) -> &'static Rule {
    &rules()[name.index()]
}

fn emit_setlenz(caps: &Captures<'_>) -> Option<String> {
    (caps["var"] == caps["idx"])
        .then(|| format!("{}VARCHAR_SETLENZ({});", &caps["indent"], &caps["var"]))
}

fn emit_v_copy_terminated(caps: &Captures<'_>) -> Option<String> {
    if caps["dst"] != caps["dst2"] || caps["src"] != caps["src2"] {
        return None;
    }
    emit_v_copy(caps)
}

fn emit_v_copy(caps: &Captures<'_>) -> Option<String> {
    Some(format!(
        "{}v_copy({}, {});",
        &caps["indent"], &caps["dst"], &caps["src"]
    ))
}

fn emit_vp_copy(caps: &Captures<'_>) -> Option<String> {
    Some(format!(
        "{}vp_copy({}, {});",
        &caps["indent"], &caps["dst"], &caps["lit"]
    ))
}

fn emit_v_sprintf(caps: &Captures<'_>) -> Option<String> {
    Some(format!(
        "{}VARCHAR_sprintf({}, {});",
        &caps["indent"], &caps["dst"], &caps["args"]
    ))
}

fn emit_zsetlen(caps: &Captures<'_>) -> Option<String> {
    Some(format!("{}VARCHAR_ZSETLEN({});", &caps["indent"], &caps["dst"]))
}
