// Template interpreter
// Recursive descent over the template: literals, escapes and directive dispatch

use std::fmt;

use crate::context::ProcessContext;
use crate::cursor::Cursor;
use crate::params::ParamTable;
use crate::sink::{BufferSink, Sink};
use crate::RenderError;

/// Deepest conditional nesting honoured; a `?` past this depth is literal text
pub const MAX_CONDITIONAL_DEPTH: usize = 32;

/// Evaluates one template against a parameter table and a rendered message
pub struct Interpreter<'a, C: ProcessContext + ?Sized> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) params: &'a ParamTable<'a>,
    pub(crate) message: &'a str,
    pub(crate) context: &'a C,
    pub(crate) message_emitted: bool,
}

impl<'a, C: ProcessContext + ?Sized> Interpreter<'a, C> {
    pub fn new(
        template: &'a str,
        params: &'a ParamTable<'a>,
        message: &'a str,
        context: &'a C,
    ) -> Self {
        Self {
            cursor: Cursor::new(template),
            params,
            message,
            context,
            message_emitted: false,
        }
    }

    /// Whether `%m` has placed the message so far
    pub fn message_emitted(&self) -> bool {
        self.message_emitted
    }

    /// Render the whole line: template, trailing message if `%m` never
    /// appeared, then the newline.
    pub fn run<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<(), RenderError> {
        self.evaluate_block(sink, None, 0, true)?;

        if !self.message_emitted && !self.message.is_empty() {
            sink.append_char(' ')?;
            sink.append(self.message)?;
        }
        sink.append_char('\n')
    }

    /// Evaluate until `delimiter` (consumed) or the end of the template.
    ///
    /// With `emit` false nothing reaches the sink and `%m` does not count
    /// as placed; the cursor still moves exactly as it would when emitting.
    pub(crate) fn evaluate_block<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        delimiter: Option<char>,
        depth: usize,
        emit: bool,
    ) -> Result<(), RenderError> {
        while let Some(c) = self.cursor.peek() {
            if Some(c) == delimiter {
                self.cursor.advance();
                return Ok(());
            }

            let handled = match c {
                '%' => self.eval_percent(sink, emit)?,
                '$' => self.eval_parameter(sink, emit)?,
                '?' => self.eval_conditional(sink, depth, emit)?,
                '\\' => self.eval_escape(sink, emit)?,
                _ => false,
            };

            if !handled {
                self.cursor.advance();
                self.emit_char(sink, c, emit)?;
            }
        }
        Ok(())
    }

    /// Move past a block without emitting anything.
    ///
    /// Runs the evaluator in silent mode so both agree on where nested
    /// blocks, escapes and directives end.
    pub(crate) fn skip_block<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        delimiter: char,
        depth: usize,
    ) -> Result<(), RenderError> {
        self.evaluate_block(sink, Some(delimiter), depth, false)
    }

    pub(crate) fn emit_char<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
        c: char,
        emit: bool,
    ) -> Result<(), RenderError> {
        if emit {
            sink.append_char(c)
        } else {
            Ok(())
        }
    }

    pub(crate) fn emit_str<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
        text: &str,
        emit: bool,
    ) -> Result<(), RenderError> {
        if emit {
            sink.append(text)
        } else {
            Ok(())
        }
    }
}

/// Render one log line into `sink`.
///
/// A `None` template bypasses the directive language: only the message and
/// the newline are written.
pub fn render<S, C>(
    sink: &mut S,
    template: Option<&str>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
    context: &C,
) -> Result<(), RenderError>
where
    S: Sink + ?Sized,
    C: ProcessContext + ?Sized,
{
    let message = match message.as_str() {
        Some(text) => std::borrow::Cow::Borrowed(text),
        None => std::borrow::Cow::Owned(fmt::format(message)),
    };

    let Some(template) = template else {
        sink.append(&message)?;
        return sink.append_char('\n');
    };

    Interpreter::new(template, params, &message, context).run(sink)
}

/// Render one log line into a fresh `String`
pub fn render_to_string<C: ProcessContext + ?Sized>(
    template: Option<&str>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
    context: &C,
) -> String {
    let mut sink = BufferSink::new();
    if let Err(e) = render(&mut sink, template, params, message, context) {
        log::warn!("Log line rendering stopped early: {}", e);
    }
    sink.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FixedContext;
    use crate::params::Value;
    use chrono::{Local, TimeZone};

    fn context() -> FixedContext {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        FixedContext::new(4242, 1, now)
    }

    fn line(template: &str, params: &ParamTable<'_>, message: &str) -> String {
        render_to_string(Some(template), params, format_args!("{}", message), &context())
    }

    #[test]
    fn test_plain_template_appends_message() {
        let params = ParamTable::new();
        assert_eq!(line("plain text", &params, "message"), "plain text message\n");
        assert_eq!(line("", &params, "message"), " message\n");
    }

    #[test]
    fn test_empty_message_adds_no_separator() {
        let params = ParamTable::new();
        assert_eq!(line("plain", &params, ""), "plain\n");
    }

    #[test]
    fn test_null_template() {
        let params = ParamTable::from_pairs([("%d", Value::from(1))]);
        let out = render_to_string(None, &params, format_args!("only {}", "this"), &context());
        assert_eq!(out, "only this\n");
    }

    #[test]
    fn test_message_placed_once() {
        let params = ParamTable::new();
        assert_eq!(line("[%m]", &params, "message"), "[message]\n");
        assert_eq!(line("%m %m", &params, "message"), "message \n");
    }

    #[test]
    fn test_message_in_skipped_branch_is_appended() {
        let params = ParamTable::new();
        assert_eq!(line("?0:%m:no:", &params, "message"), "no message\n");
    }

    #[test]
    fn test_interpreter_reports_emission() {
        let params = ParamTable::new();
        let ctx = context();
        let mut interpreter = Interpreter::new("<%m>", &params, "hi", &ctx);
        let mut sink = BufferSink::new();
        interpreter.run(&mut sink).unwrap();
        assert!(interpreter.message_emitted());
        assert_eq!(sink.as_str(), "<hi>\n");
    }

    struct FullSink {
        written: String,
        room: usize,
    }

    impl Sink for FullSink {
        fn append(&mut self, text: &str) -> Result<(), RenderError> {
            if self.written.len() + text.len() > self.room {
                return Err(RenderError::Fmt(fmt::Error));
            }
            self.written.push_str(text);
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_is_returned() {
        let params = ParamTable::new();
        let mut sink = FullSink {
            written: String::new(),
            room: 4,
        };
        let result = render(&mut sink, Some("[%p] %m"), &params, format_args!("hi"), &context());
        assert!(matches!(result, Err(RenderError::Fmt(_))));
        assert_eq!(sink.written, "[");
    }

    #[test]
    fn test_depth_cap_makes_question_mark_literal() {
        let params = ParamTable::from_pairs([("%d", Value::from(1))]);
        let mut template = String::new();
        for _ in 0..=MAX_CONDITIONAL_DEPTH {
            template.push_str("?0|");
        }
        let out = line(&template, &params, "");
        // The innermost `?0|` is beyond the cap and comes out verbatim
        assert_eq!(out, "?0\n");
    }
}
