//! Configuration options for JSON encoding.
//!
//! Output is compact by default. Pretty output puts every array element and object member
//! on its own line; key order is the recorded order in both modes.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ordered::{from_str, to_string_with_options, EncodeOptions, Value};
//!
//! let value: Value = from_str(r#"{"b":[1,2],"a":{}}"#).unwrap();
//!
//! let options = EncodeOptions::pretty().with_indent(4);
//! let json = to_string_with_options(&value, options).unwrap();
//! assert_eq!(json, "{\n    \"b\": [\n        1,\n        2\n    ],\n    \"a\": {}\n}");
//! ```

/// Configuration options for JSON encoding.
///
/// # Examples
///
/// ```rust
/// use serde_ordered::EncodeOptions;
///
/// // Default compact options
/// let options = EncodeOptions::new();
///
/// // Pretty-printed with 2-space indentation
/// let options = EncodeOptions::pretty();
///
/// // Pretty-printed with 8-space indentation
/// let options = EncodeOptions::new().with_pretty(true).with_indent(8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub indent: usize,
    pub pretty: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            indent: 2,
            pretty: false,
        }
    }
}

impl EncodeOptions {
    /// Creates default options (compact output, 2-space indent when pretty).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::EncodeOptions;
    ///
    /// let options = EncodeOptions::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(!options.pretty);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output with newlines and indentation.
    #[must_use]
    pub fn pretty() -> Self {
        EncodeOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Default is 2. Only affects pretty-printed output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ordered::EncodeOptions;
    ///
    /// let options = EncodeOptions::pretty().with_indent(4);
    /// assert_eq!(options.indent, 4);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
