use chrono::{Local, TimeZone, Timelike};
use lll_template::{
    render, render_to_string, BufferSink, FixedContext, ParamTable, StreamSink, SystemContext,
    Value, DEFAULT_CAPACITY,
};

fn fixed() -> FixedContext {
    let now = Local.with_ymd_and_hms(2012, 6, 1, 8, 30, 0).unwrap();
    FixedContext::new(100, 1, now)
}

#[test]
fn test_templates_without_directives() {
    let params = ParamTable::new();
    for template in ["", "plain", "with spaces ", "ünïcödé"] {
        let out = render_to_string(Some(template), &params, format_args!("message"), &fixed());
        assert_eq!(out, format!("{} message\n", template));
    }
}

#[test]
fn test_message_with_arguments() {
    let params = ParamTable::new();
    let out = render_to_string(
        Some(""),
        &params,
        format_args!("message with param {} {}", 2, "deux"),
        &fixed(),
    );
    assert_eq!(out, " message with param 2 deux\n");
}

#[test]
fn test_double_percent_never_dispatches() {
    let params = ParamTable::from_pairs([("%d", Value::from(5))]);
    let out = render_to_string(Some("%%m %%p %%%%"), &params, format_args!("msg"), &fixed());
    assert_eq!(out, "%m %p %% msg\n");
}

#[test]
fn test_number_parameters() {
    let params = ParamTable::from_pairs([
        ("%d", Value::from(2)),
        ("%e", Value::from(123.456)),
        ("%Le", Value::from(123.456)),
        ("%#x", Value::from(48879)),
    ]);
    let out = render_to_string(Some("$0 $1 $2 $3"), &params, format_args!("message"), &fixed());
    assert_eq!(out, "2 1.234560e+02 1.234560e+02 0xbeef message\n");
}

#[test]
fn test_missing_parameter_renders_empty() {
    let params = ParamTable::from_pairs([("%d", Value::from(1)), ("%d", Value::from(2))]);
    let out = render_to_string(Some("[$3]"), &params, format_args!("message"), &fixed());
    assert_eq!(out, "[] message\n");
}

#[test]
fn test_current_time_matches_clock() {
    let params = ParamTable::new();
    let before = Local::now();
    let out = render_to_string(Some("%T{%H:%M}"), &params, format_args!(""), &SystemContext);
    let after = Local::now();

    let candidates = [before, after].map(|t| format!("{:02}:{:02}\n", t.hour(), t.minute()));
    assert!(candidates.contains(&out), "unexpected time line {:?}", out);
}

#[test]
fn test_pid_from_system_context() {
    let params = ParamTable::new();
    let out = render_to_string(Some("%p"), &params, format_args!(""), &SystemContext);
    assert_eq!(out, format!("{}\n", std::process::id()));
}

#[test]
fn test_large_message_survives_growth() {
    let params = ParamTable::from_pairs([("%s", Value::from("prefix"))]);
    let big: String = "0123456789".repeat(DEFAULT_CAPACITY);

    let mut sink = BufferSink::new();
    render(&mut sink, Some("$0: %m"), &params, format_args!("{}", big), &fixed()).unwrap();

    let expected = format!("prefix: {}\n", big);
    assert!(sink.len() > DEFAULT_CAPACITY);
    assert_eq!(sink.as_bytes(), expected.as_bytes());
}

#[test]
fn test_stream_sink_matches_buffer_sink() {
    let params = ParamTable::from_pairs([("%s", Value::from("f.c")), ("%d", Value::from(9))]);
    let template = "[%T] %p ?0:at $0?1|:$1||:-: %m";

    let mut stream = StreamSink::new(Vec::new());
    render(&mut stream, Some(template), &params, format_args!("boom"), &fixed()).unwrap();

    let buffered = render_to_string(Some(template), &params, format_args!("boom"), &fixed());
    assert_eq!(String::from_utf8(stream.into_inner()).unwrap(), buffered);
    assert_eq!(buffered, "[2012-06-01 08:30:00] 100 at f.c:9 boom\n");
}
