//! Read cursor over an in-memory JSON buffer.
//!
//! The cursor only knows about structure: whitespace, single-byte tokens and where the
//! next literal starts. Literals themselves (numbers, strings, `true`, `false`, `null`)
//! are decoded by `serde_json`, and the cursor advances by exactly the number of bytes
//! the codec reports having consumed.

use crate::{Error, Result};
use serde::de::DeserializeOwned;

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// A read position over a borrowed byte buffer.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::Cursor;
///
/// let mut cursor = Cursor::new(b"  [ 42 ]");
/// assert_eq!(cursor.peek(), Some(b'['));
/// cursor.expect(b'[').unwrap();
///
/// let n: u32 = cursor.decode_scalar().unwrap();
/// assert_eq!(n, 42);
///
/// cursor.expect(b']').unwrap();
/// assert!(!cursor.has_more());
/// ```
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Cursor { input, position: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The unread part of the buffer, whitespace included.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && is_space(self.input[self.position]) {
            self.position += 1;
        }
    }

    /// Skips whitespace and returns the next significant byte without consuming it.
    ///
    /// Returns `None` once the buffer is exhausted. Calling `peek` again without
    /// moving returns the same byte.
    pub fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.position).copied()
    }

    /// Returns `true` if no bytes at all (whitespace included) remain.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Returns `true` if a non-whitespace byte remains.
    pub fn has_more(&mut self) -> bool {
        self.peek().is_some()
    }

    /// Moves the position by `n` bytes (backwards when negative).
    ///
    /// Moving before the start or past the end clamps the position to that bound and
    /// returns an [`Error::OutOfRange`].
    pub fn advance(&mut self, n: isize) -> Result<()> {
        let len = self.input.len();
        match self.position.checked_add_signed(n) {
            None => {
                self.position = 0;
                Err(Error::out_of_range(
                    0,
                    len,
                    "negative move before beginning of buffer",
                ))
            }
            Some(target) if target > len => {
                self.position = len;
                Err(Error::out_of_range(len, len, "move past end of buffer"))
            }
            Some(target) => {
                self.position = target;
                Ok(())
            }
        }
    }

    /// Consumes `token` if it is the next significant byte.
    pub fn expect(&mut self, token: u8) -> Result<()> {
        let next = self.peek();
        let (line, col) = self.location();
        match next {
            None => Err(Error::unexpected_end(
                line,
                col,
                &format!("'{}'", char::from(token)),
            )),
            Some(found) if found != token => Err(Error::unexpected_token(line, col, token, found)),
            Some(_) => self.advance(1),
        }
    }

    /// Decodes one literal starting at the current position through `serde_json`.
    ///
    /// The codec reads from the remaining buffer and the cursor then moves forward by
    /// the codec's reported byte offset, nothing more and nothing less.
    pub fn decode_scalar<T>(&mut self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.skip_whitespace();
        let (line, col) = self.location();
        let mut stream = serde_json::Deserializer::from_slice(self.remaining()).into_iter::<T>();
        match stream.next() {
            Some(Ok(value)) => {
                let consumed = stream.byte_offset();
                self.advance(consumed as isize)?;
                Ok(value)
            }
            Some(Err(err)) => Err(Error::scalar(line, col, err)),
            None => Err(Error::unexpected_end(line, col, "a value")),
        }
    }

    /// 1-based line and column of the current position.
    #[must_use]
    pub fn location(&self) -> (usize, usize) {
        let consumed = &self.input[..self.position];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = consumed
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        (line, self.position - line_start + 1)
    }

    pub(crate) fn unexpected_end(&self, expected: &str) -> Error {
        let (line, col) = self.location();
        Error::unexpected_end(line, col, expected)
    }
}
