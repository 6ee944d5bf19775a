// lll-template - Template engine for lll log lines
// Parses and evaluates the template language against a bounded parameter table

pub mod context;
pub mod cursor;
mod directives;
pub mod interpreter;
pub mod params;
pub mod printf;
pub mod sink;

pub use context::{FixedContext, ProcessContext, SystemContext};
pub use cursor::Cursor;
pub use interpreter::{render, render_to_string, Interpreter, MAX_CONDITIONAL_DEPTH};
pub use params::{ParamKind, ParamTable, Parameter, Value, MAX_PARAMS};
pub use sink::{BufferSink, Sink, StreamSink, DEFAULT_CAPACITY};

/// Errors raised while writing a rendered line into a sink
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("I/O error while writing log line: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error while rendering message")]
    Fmt(#[from] std::fmt::Error),
}
