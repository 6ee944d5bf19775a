// Level-gated logger bound to one template and one destination

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use lll_template::{BufferSink, ParamTable, ProcessContext, StreamSink, SystemContext};

use crate::destination::{open_append, report};
use crate::{Level, LogError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Stderr,
    /// Opened in append mode for every line and closed again
    File(PathBuf),
}

/// How a rendered line reaches the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Buffering {
    /// Render into memory, then issue a single write
    #[default]
    Line,
    /// Write each piece as the template is evaluated
    Direct,
}

#[derive(Debug)]
pub struct Logger<C: ProcessContext = SystemContext> {
    template: Option<String>,
    threshold: Level,
    destination: Destination,
    buffering: Buffering,
    context: C,
}

impl Logger<SystemContext> {
    pub fn new(destination: Destination) -> Self {
        Self {
            template: None,
            threshold: Level::Info,
            destination,
            buffering: Buffering::default(),
            context: SystemContext,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Destination::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(Destination::Stderr)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Destination::File(path.into()))
    }
}

impl<C: ProcessContext> Logger<C> {
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Log bare messages, skipping the template language entirely
    pub fn without_template(mut self) -> Self {
        self.template = None;
        self
    }

    pub fn threshold(mut self, threshold: Level) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn buffering(mut self, buffering: Buffering) -> Self {
        self.buffering = buffering;
        self
    }

    /// Swap the source of pid, ppid and time
    pub fn context<D: ProcessContext>(self, context: D) -> Logger<D> {
        Logger {
            template: self.template,
            threshold: self.threshold,
            destination: self.destination,
            buffering: self.buffering,
            context,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.enabled_at(self.threshold)
    }

    /// Write a line if `level` passes the threshold. Returns whether it did.
    pub fn try_log(
        &self,
        level: Level,
        params: &ParamTable<'_>,
        message: fmt::Arguments<'_>,
    ) -> Result<bool, LogError> {
        if !self.enabled(level) {
            log::debug!("Dropped {} line, threshold is {}", level, self.threshold);
            return Ok(false);
        }

        match &self.destination {
            Destination::Stdout => self.write_to(&mut io::stdout().lock(), params, message)?,
            Destination::Stderr => self.write_to(&mut io::stderr().lock(), params, message)?,
            Destination::File(path) => {
                let mut file = open_append(path)?;
                self.write_to(&mut file, params, message)?;
            }
        }
        Ok(true)
    }

    /// `try_log`, with failures reported on stderr instead of returned
    pub fn log(&self, level: Level, params: &ParamTable<'_>, message: fmt::Arguments<'_>) -> bool {
        match self.try_log(level, params, message) {
            Ok(written) => written,
            Err(e) => {
                report(&e);
                false
            }
        }
    }

    /// Render straight into `stream`, bypassing the configured destination
    pub fn write_to<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        params: &ParamTable<'_>,
        message: fmt::Arguments<'_>,
    ) -> Result<(), LogError> {
        let template = self.template.as_deref();
        match self.buffering {
            Buffering::Line => {
                let mut sink = BufferSink::new();
                lll_template::render(&mut sink, template, params, message, &self.context)?;
                stream.write_all(sink.as_bytes())?;
            }
            Buffering::Direct => {
                let mut sink = StreamSink::new(&mut *stream);
                lll_template::render(&mut sink, template, params, message, &self.context)?;
                sink.flush()?;
            }
        }
        Ok(())
    }
}
