// Directive evaluators
// Each returns Ok(true) when it consumed a directive, Ok(false) to leave the
// trigger character to the literal fallback with the cursor untouched

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};

use crate::context::ProcessContext;
use crate::interpreter::{Interpreter, MAX_CONDITIONAL_DEPTH};
use crate::sink::Sink;
use crate::RenderError;

/// `%T` without braces: `YYYY-MM-DD HH:MM:SS`
pub(crate) const DEFAULT_TIME_FORMAT: &str = "%F %T";

/// Size of the time format buffer in bytes, terminator included
pub(crate) const TIME_FORMAT_LIMIT: usize = 64;

impl<'a, C: ProcessContext + ?Sized> Interpreter<'a, C> {
    /// `%T`, `%T{fmt}`, `%p`, `%P`, `%m`, `%%`
    pub(crate) fn eval_percent<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        emit: bool,
    ) -> Result<bool, RenderError> {
        match self.cursor.peek_nth(1) {
            Some('%') => {
                self.cursor.advance_by(2);
                self.emit_char(sink, '%', emit)?;
                Ok(true)
            }
            Some('T') => self.eval_time(sink, emit),
            Some('p') => {
                self.cursor.advance_by(2);
                if emit {
                    sink.append(&self.context.pid().to_string())?;
                }
                Ok(true)
            }
            Some('P') => {
                self.cursor.advance_by(2);
                if emit {
                    sink.append(&self.context.ppid().to_string())?;
                }
                Ok(true)
            }
            Some('m') => {
                self.cursor.advance_by(2);
                if emit && !self.message_emitted {
                    sink.append(self.message)?;
                    self.message_emitted = true;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn eval_time<S: Sink + ?Sized>(&mut self, sink: &mut S, emit: bool) -> Result<bool, RenderError> {
        let mut lookahead = self.cursor;
        lookahead.advance_by(2);

        let format = if lookahead.peek() == Some('{') {
            lookahead.advance();
            let start = lookahead.position();
            let mut len = 0;
            loop {
                match lookahead.peek() {
                    Some('}') => break,
                    None => {
                        log::warn!(
                            "Reached the end of template string without finding closing brace for %T"
                        );
                        return Ok(false);
                    }
                    Some(c) if len + c.len_utf8() >= TIME_FORMAT_LIMIT => {
                        log::warn!(
                            "Time format longer than {} bytes, %T left as text",
                            TIME_FORMAT_LIMIT - 1
                        );
                        return Ok(false);
                    }
                    Some(c) => {
                        lookahead.advance();
                        len += c.len_utf8();
                    }
                }
            }
            let format = lookahead.slice(start, lookahead.position());
            lookahead.advance();
            format
        } else {
            DEFAULT_TIME_FORMAT
        };

        self.cursor = lookahead;
        if emit {
            self.write_time(sink, format)?;
        }
        Ok(true)
    }

    fn write_time<S: Sink + ?Sized>(&self, sink: &mut S, format: &str) -> Result<(), RenderError> {
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            log::warn!("Invalid time format {:?}", format);
            return Ok(());
        }

        let mut rendered = String::new();
        if let Err(e) = write!(rendered, "{}", self.context.now().format_with_items(items.iter())) {
            log::warn!("Time format {:?} could not be rendered: {}", format, e);
            return Ok(());
        }
        sink.append(&rendered)
    }

    /// `$N`
    pub(crate) fn eval_parameter<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        emit: bool,
    ) -> Result<bool, RenderError> {
        let Some(index) = self.cursor.peek_digit(1) else {
            return Ok(false);
        };
        self.cursor.advance_by(2);

        if emit {
            if let Some(param) = self.params.get(index) {
                param.render(sink)?;
            }
        }
        Ok(true)
    }

    /// `?N<d>true<d>false<d>`
    pub(crate) fn eval_conditional<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        depth: usize,
        emit: bool,
    ) -> Result<bool, RenderError> {
        let Some(index) = self.cursor.peek_digit(1) else {
            return Ok(false);
        };
        let Some(delimiter) = self.cursor.peek_nth(2) else {
            return Ok(false);
        };
        if depth >= MAX_CONDITIONAL_DEPTH {
            log::debug!(
                "Conditional nesting deeper than {}, '?' left as text",
                MAX_CONDITIONAL_DEPTH
            );
            return Ok(false);
        }
        self.cursor.advance_by(3);

        let truthy = self.params.get(index).is_some_and(|param| param.is_truthy());
        if truthy {
            self.evaluate_block(sink, Some(delimiter), depth + 1, emit)?;
            self.skip_block(sink, delimiter, depth + 1)?;
        } else {
            self.skip_block(sink, delimiter, depth + 1)?;
            self.evaluate_block(sink, Some(delimiter), depth + 1, emit)?;
        }
        Ok(true)
    }

    /// `\C`
    pub(crate) fn eval_escape<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        emit: bool,
    ) -> Result<bool, RenderError> {
        self.cursor.advance();
        if let Some(c) = self.cursor.advance() {
            self.emit_char(sink, c, emit)?;
        }
        Ok(true)
    }
}
