//! Error types for order-preserving decoding and encoding.
//!
//! Every decode failure that happens over a [`Cursor`](crate::Cursor) carries the
//! 1-based line and column where the problem was detected.
//!
//! ## Error Categories
//!
//! - **Structural errors**: missing `:` / `,` / closing brackets, bad value starts,
//!   trailing data, truncated input
//! - **Scalar errors**: reported verbatim by the scalar codec (`serde_json`)
//! - **Tree errors**: YAML constructs the adapter refuses (aliases, nested documents,
//!   non-scalar keys)
//! - **Consistency errors**: a corrupted [`OrderedMap`](crate::OrderedMap)
//!
//! ## Examples
//!
//! ```rust
//! use serde_ordered::{from_str, Error, Value};
//!
//! let result: Result<Value, Error> = from_str("[1,2,3,]");
//! assert!(matches!(result, Err(Error::InvalidValueStart { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input ran out while a token or value was still expected
    #[error("Unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEnd {
        line: usize,
        col: usize,
        expected: String,
    },

    /// A required structural character was not found
    #[error(
        "Unexpected token at line {line}, column {col}: expected '{expected}', found '{}'",
        show_byte(.found)
    )]
    UnexpectedToken {
        line: usize,
        col: usize,
        expected: char,
        found: char,
    },

    /// The next byte cannot begin any JSON value
    #[error(
        "Invalid value start at line {line}, column {col}: expected a value, found '{}'",
        show_byte(.found)
    )]
    InvalidValueStart { line: usize, col: usize, found: char },

    /// An object key does not start with a double quote
    #[error(
        "Invalid object key at line {line}, column {col}: expected '\"', found '{}'",
        show_byte(.found)
    )]
    KeyFormat { line: usize, col: usize, found: char },

    /// A complete value was decoded but more non-whitespace input follows
    #[error("Trailing data at line {line}, column {col} after the end of the value")]
    TrailingData { line: usize, col: usize },

    /// The scalar codec rejected a literal
    #[error("Invalid literal at line {line}, column {col}: {msg}")]
    Scalar { line: usize, col: usize, msg: String },

    /// A cursor move left the buffer
    #[error("Cursor out of range at position {position} (length {len}): {msg}")]
    OutOfRange {
        position: usize,
        len: usize,
        msg: String,
    },

    /// A YAML construct the tree adapter does not handle
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Recorded key order and lookup disagree
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    /// A typed map key does not serialize to a JSON string
    #[error("Object key must be a string: {0}")]
    KeyMustBeString(String),

    /// YAML scanning or emitting failed
    #[error("YAML error: {0}")]
    Yaml(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an unexpected end-of-input error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::Error;
    ///
    /// let err = Error::unexpected_end(1, 2, "a value");
    /// assert!(err.to_string().contains("expected a value"));
    /// ```
    pub fn unexpected_end(line: usize, col: usize, expected: &str) -> Self {
        Error::UnexpectedEnd {
            line,
            col,
            expected: expected.to_string(),
        }
    }

    pub fn unexpected_token(line: usize, col: usize, expected: u8, found: u8) -> Self {
        Error::UnexpectedToken {
            line,
            col,
            expected: char::from(expected),
            found: char::from(found),
        }
    }

    pub fn invalid_value_start(line: usize, col: usize, found: u8) -> Self {
        Error::InvalidValueStart {
            line,
            col,
            found: char::from(found),
        }
    }

    pub fn key_format(line: usize, col: usize, found: u8) -> Self {
        Error::KeyFormat {
            line,
            col,
            found: char::from(found),
        }
    }

    pub fn trailing_data(line: usize, col: usize) -> Self {
        Error::TrailingData { line, col }
    }

    /// Wraps a scalar codec error with the position of the literal it failed on.
    pub fn scalar<T: fmt::Display>(line: usize, col: usize, err: T) -> Self {
        Error::Scalar {
            line,
            col,
            msg: err.to_string(),
        }
    }

    pub fn out_of_range(position: usize, len: usize, msg: &str) -> Self {
        Error::OutOfRange {
            position,
            len,
            msg: msg.to_string(),
        }
    }

    /// Creates an error for a YAML construct the adapter refuses.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::Error;
    ///
    /// let err = Error::unsupported("unexpected alias node");
    /// assert!(err.to_string().contains("alias"));
    /// ```
    pub fn unsupported(msg: &str) -> Self {
        Error::UnsupportedConstruct(msg.to_string())
    }

    pub fn internal_consistency(msg: &str) -> Self {
        Error::InternalConsistency(msg.to_string())
    }

    pub fn key_must_be_string<T: fmt::Display>(msg: T) -> Self {
        Error::KeyMustBeString(msg.to_string())
    }

    pub fn yaml<T: fmt::Display>(err: T) -> Self {
        Error::Yaml(err.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` if more input could have completed the document.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::{from_str, Value};
    ///
    /// let err = from_str::<Value>("{\"a\":[1,2").unwrap_err();
    /// assert!(err.is_eof());
    /// ```
    #[must_use]
    pub fn is_eof(&self) -> bool {
        match self {
            Error::UnexpectedEnd { .. } => true,
            Error::Scalar { msg, .. } => msg.contains("EOF"),
            _ => false,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Renders an offending input byte. Bytes past ASCII are shown as `\xNN` since they
/// are usually one piece of a multi-byte UTF-8 sequence.
fn show_byte(found: &char) -> String {
    if found.is_ascii() {
        found.to_string()
    } else {
        format!("\\x{:02X}", u32::from(*found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_render_chars() {
        let err = Error::unexpected_token(3, 7, b':', b',');
        assert_eq!(
            err.to_string(),
            "Unexpected token at line 3, column 7: expected ':', found ','"
        );
    }

    #[test]
    fn test_non_ascii_bytes_render_as_escapes() {
        let err = Error::unexpected_token(1, 4, b',', 0xC3);
        assert_eq!(
            err.to_string(),
            "Unexpected token at line 1, column 4: expected ',', found '\\xC3'"
        );
        let err = Error::invalid_value_start(2, 1, 0xE2);
        assert!(err.to_string().ends_with("found '\\xE2'"));
    }

    #[test]
    fn test_is_eof() {
        assert!(Error::unexpected_end(1, 1, "a value").is_eof());
        assert!(!Error::trailing_data(1, 3).is_eof());
        assert!(!Error::unsupported("alias").is_eof());
    }
}
