// lll - Little log line library
// Renders template-driven log lines to buffers, streams and files

mod destination;
mod error;
mod level;
mod logger;
mod macros;

pub use destination::{fprint, pprint, print, render, try_fprint, try_pprint, AsTemplate};
pub use error::LogError;
pub use level::{Level, ParseLevelError};
pub use logger::{Buffering, Destination, Logger};

pub use lll_template::{
    printf, BufferSink, FixedContext, ParamKind, ParamTable, Parameter, ProcessContext,
    RenderError, Sink, StreamSink, SystemContext, Value, MAX_PARAMS,
};
