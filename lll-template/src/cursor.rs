// Read position over a template string

/// Immutable view of a template plus a forward-only read position.
///
/// The cursor is `Copy`: evaluators that need lookahead beyond `peek_nth`
/// scan with a copy and commit it by assignment once the directive matched.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Byte offset into the template
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Unread part of the template
    pub fn rest(&self) -> &'a str {
        self.source.get(self.pos..).unwrap_or("")
    }

    /// Template text between two byte offsets previously returned by `position`
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character `n` positions ahead of the current one
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Value of the ASCII digit `n` positions ahead, if there is one
    pub fn peek_digit(&self, n: usize) -> Option<usize> {
        self.peek_nth(n)
            .filter(char::is_ascii_digit)
            .and_then(|c| c.to_digit(10))
            .map(|d| d as usize)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }
}
