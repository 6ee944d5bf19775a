// Output sinks: where rendered template output goes before the final flush

use std::fmt;
use std::io::Write;

use crate::params::Value;
use crate::printf;
use crate::RenderError;

/// Initial capacity of a `BufferSink`
pub const DEFAULT_CAPACITY: usize = 128;

/// Append-only destination for rendered output.
///
/// One sink belongs to one log call; implementations need no locking.
pub trait Sink {
    fn append(&mut self, text: &str) -> Result<(), RenderError>;

    fn append_char(&mut self, c: char) -> Result<(), RenderError> {
        self.append(c.encode_utf8(&mut [0u8; 4]))
    }

    /// Render one value through a printf-style specifier
    fn append_formatted(&mut self, spec: &str, value: &Value<'_>) -> Result<(), RenderError> {
        self.append(&printf::format_value(spec, value))
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn append(&mut self, text: &str) -> Result<(), RenderError> {
        (**self).append(text)
    }

    fn append_char(&mut self, c: char) -> Result<(), RenderError> {
        (**self).append_char(c)
    }

    fn append_formatted(&mut self, spec: &str, value: &Value<'_>) -> Result<(), RenderError> {
        (**self).append_formatted(spec, value)
    }
}

/// Growable in-memory buffer.
///
/// Growth is delegated to `String`, which at least doubles its capacity
/// when a write does not fit; earlier content is never lost or truncated.
#[derive(Debug, Clone)]
pub struct BufferSink {
    buf: String,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for BufferSink {
    fn append(&mut self, text: &str) -> Result<(), RenderError> {
        self.buf.reserve(text.len());
        self.buf.push_str(text);
        Ok(())
    }

    fn append_char(&mut self, c: char) -> Result<(), RenderError> {
        self.buf.push(c);
        Ok(())
    }

    fn append_formatted(&mut self, spec: &str, value: &Value<'_>) -> Result<(), RenderError> {
        printf::write_formatted(&mut self.buf, spec, std::slice::from_ref(value))?;
        Ok(())
    }
}

impl fmt::Write for BufferSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

/// Writes straight through to an `io::Write` as output is produced
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Bytes written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), RenderError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn append(&mut self, text: &str) -> Result<(), RenderError> {
        self.inner.write_all(text.as_bytes())?;
        self.written += text.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_appends() {
        let mut sink = BufferSink::new();
        sink.append("pid ").unwrap();
        sink.append_formatted("%05d", &Value::from(42)).unwrap();
        sink.append_char('!').unwrap();
        assert_eq!(sink.as_str(), "pid 00042!");
        assert_eq!(sink.len(), 10);
    }

    #[test]
    fn test_buffer_sink_grows_past_default_capacity() {
        let mut sink = BufferSink::new();
        let head = "head:";
        let body: String = (0..DEFAULT_CAPACITY * 20)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();

        sink.append(head).unwrap();
        sink.append(&body).unwrap();

        assert!(sink.capacity() >= head.len() + body.len());
        assert_eq!(&sink.as_bytes()[..head.len()], head.as_bytes());
        assert_eq!(&sink.as_bytes()[head.len()..], body.as_bytes());
    }

    #[test]
    fn test_stream_sink_writes_through() {
        let mut sink = StreamSink::new(Vec::new());
        sink.append("a").unwrap();
        sink.append_char('é').unwrap();
        sink.append_formatted("%x", &Value::from(255)).unwrap();
        assert_eq!(sink.written(), 5);
        assert_eq!(sink.into_inner(), "aéff".as_bytes());
    }
}
