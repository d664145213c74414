use better_varchar::{
    Driver, LineRange, MatchRecord, Pipeline, RuleName, RuleSet, Scope,
};
use std::fs;

fn load_fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

fn fired(records: &[MatchRecord]) -> Vec<(RuleName, usize)> {
    records.iter().map(|r| (r.rule, r.line)).collect()
}

#[test]
fn whole_file_fixture() {
    let input = load_fixture("orders.pc.input");
    let expected = load_fixture("orders.pc.expected");

    let rewrite = Driver::default().rewrite_source(&input);
    assert_eq!(rewrite.rewritten, expected);
    assert_eq!(
        fired(&rewrite.records),
        vec![
            (RuleName::Setlenz, 22),
            (RuleName::Setlenz, 23),
            (RuleName::VCopy1, 29),
            (RuleName::VpCopy, 32),
            (RuleName::VSprintf, 34),
            (RuleName::Zsetlen, 15),
            (RuleName::Zsetlen, 36),
        ]
    );

    // Second application is a no-op
    let again = Driver::default().rewrite_source(&rewrite.rewritten);
    assert_eq!(again.rewritten, expected);
    assert!(again.records.is_empty());
}

#[test]
fn function_scope_fixture() {
    let input = load_fixture("orders.pc.input");
    let expected = load_fixture("orders.pc.expected");

    let scope = Scope {
        functions: vec!["describe_order".to_string()],
        ..Scope::default()
    };
    let rewrite = Driver::new(scope, Pipeline::new()).rewrite_source(&input);
    assert_eq!(rewrite.ranges, vec![LineRange::new(26, 37)]);

    // fetch_order keeps its original text, describe_order matches the golden
    let input_lines: Vec<&str> = input.lines().collect();
    let output_lines: Vec<&str> = rewrite.rewritten.lines().collect();
    assert_eq!(output_lines[..26], input_lines[..26]);
    let expected_tail: Vec<&str> = expected.lines().skip(26).collect();
    assert_eq!(output_lines[26..], expected_tail[..]);
}

#[test]
fn line_range_fixture() {
    let input = load_fixture("orders.pc.input");

    let scope = Scope {
        lines: Some("22:23".parse().unwrap()),
        ..Scope::default()
    };
    let rewrite = Driver::new(scope, Pipeline::new()).rewrite_source(&input);
    assert_eq!(fired(&rewrite.records), vec![(RuleName::Setlenz, 22), (RuleName::Setlenz, 23)]);
    assert!(rewrite.rewritten.contains("order_id.len = strlen(order_id.arr);"));
    assert!(rewrite.rewritten.contains("strcpy(message.arr, customer.arr);"));
}

#[test]
fn only_fixture() {
    let input = load_fixture("orders.pc.input");
    let only: RuleSet = [RuleName::VCopy2].into_iter().collect();

    let rewrite = Driver::new(Scope::whole_file(), Pipeline::with_only(only)).rewrite_source(&input);
    let expected = input.replace(
        "    strcpy(message.arr, customer.arr);\n",
        "    v_copy(message, customer);\n",
    );
    assert_eq!(rewrite.rewritten, expected);
    // The dangling terminator is left for the user
    assert!(rewrite
        .rewritten
        .contains("    message.arr[customer.len] = '\\0';\n"));
}

#[test]
fn crlf_input_is_preserved() {
    let input = load_fixture("orders.pc.input").replace('\n', "\r\n");
    let expected = load_fixture("orders.pc.expected").replace('\n', "\r\n");

    let rewrite = Driver::default().rewrite_source(&input);
    assert_eq!(rewrite.rewritten, expected);
}
