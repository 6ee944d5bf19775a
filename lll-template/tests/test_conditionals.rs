use chrono::{Local, TimeZone};
use lll_template::{render_to_string, FixedContext, ParamTable, Value};

fn context() -> FixedContext {
    let now = Local.with_ymd_and_hms(2012, 6, 1, 8, 30, 0).unwrap();
    FixedContext::new(100, 1, now)
}

fn render(template: &str, params: &ParamTable<'_>) -> String {
    render_to_string(Some(template), params, format_args!("message"), &context())
}

const NESTED_COLON: &str = "?0:at $0?1:\\:$1:::no file:";
const NESTED_PIPE: &str = "?0:at $0?1|:$1||:no file:";

#[test]
fn test_nested_same_delimiter() {
    let both = ParamTable::from_pairs([("%s", Value::from("test1.c")), ("%d", Value::from(57))]);
    let no_line = ParamTable::from_pairs([("%s", Value::from("test1.c")), ("%d", Value::from(0))]);
    let no_file = ParamTable::from_pairs([("%s", Value::Pointer(None)), ("%d", Value::from(57))]);
    let neither = ParamTable::from_pairs([("%s", Value::Pointer(None)), ("%d", Value::from(0))]);

    assert_eq!(render(NESTED_COLON, &both), "at test1.c:57 message\n");
    assert_eq!(render(NESTED_COLON, &no_line), "at test1.c message\n");
    assert_eq!(render(NESTED_COLON, &no_file), "no file message\n");
    assert_eq!(render(NESTED_COLON, &neither), "no file message\n");
}

#[test]
fn test_nested_different_delimiter() {
    let both = ParamTable::from_pairs([("%s", Value::from("test1.c")), ("%d", Value::from(57))]);
    let no_line = ParamTable::from_pairs([("%s", Value::from("test1.c")), ("%d", Value::from(0))]);
    let no_file = ParamTable::from_pairs([("%s", Value::Pointer(None)), ("%d", Value::from(57))]);

    assert_eq!(render(NESTED_PIPE, &both), "at test1.c:57 message\n");
    assert_eq!(render(NESTED_PIPE, &no_line), "at test1.c message\n");
    assert_eq!(render(NESTED_PIPE, &no_file), "no file message\n");
}

#[test]
fn test_skipped_branch_respects_braced_time_format() {
    let unset = ParamTable::new();
    let set = ParamTable::from_pairs([("%d", Value::from(1))]);

    // The ':' inside %T{...} must not end the skipped branch early
    assert_eq!(render("?0:%T{%H:%M}:none:", &unset), "none message\n");
    assert_eq!(render("?0:%T{%H:%M}:none:", &set), "08:30 message\n");
}

#[test]
fn test_message_inside_branches() {
    let set = ParamTable::from_pairs([("%d", Value::from(1))]);
    assert_eq!(render("?0:<%m>:[%m]:", &set), "<message>\n");

    let unset = ParamTable::new();
    assert_eq!(render("?0:<%m>:[%m]:", &unset), "[message]\n");
}

#[test]
fn test_float_parameter_as_condition() {
    let zero = ParamTable::from_pairs([("%e", Value::from(0.0))]);
    let nonzero = ParamTable::from_pairs([("%e", Value::from(123.456))]);

    assert_eq!(render("?0:double $0:none:", &zero), "none message\n");
    assert_eq!(render("?0:double $0:none:", &nonzero), "double 1.234560e+02 message\n");
}

#[test]
fn test_every_slot_can_drive_a_condition() {
    let pairs: Vec<(&str, Value<'_>)> = (0..10).map(|i| ("%d", Value::from(i % 2))).collect();
    let params = ParamTable::from_pairs(pairs);

    let template: String = (0..10).map(|i| format!("?{}|1|0|", i)).collect();
    assert_eq!(render(&template, &params), "0101010101 message\n");
}
