//! The term value enumerated by every layer of the engine.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An indexed token value, compared as an unsigned byte sequence.
///
/// Ordering is plain lexicographic byte order, so `"B" < "a"` and a prefix
/// always sorts before its extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Term(Vec<u8>);

impl Term {
    /// Create a term from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Term(bytes.into())
    }

    /// The raw bytes of this term.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether this is the empty term.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Interpret the term as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Consume the term and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term(value.as_bytes().to_vec())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term(value.into_bytes())
    }
}

impl From<&[u8]> for Term {
    fn from(value: &[u8]) -> Self {
        Term(value.to_vec())
    }
}

impl From<Vec<u8>> for Term {
    fn from(value: Vec<u8>) -> Self {
        Term(value)
    }
}

impl AsRef<[u8]> for Term {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order() {
        assert!(Term::from("always") < Term::from("be"));
        assert!(Term::from("be") < Term::from("bee"));
        // Uppercase sorts before lowercase in byte order.
        assert!(Term::from("Zebra") < Term::from("apple"));
        // Bytes compare unsigned.
        assert!(Term::new(vec![0x7f]) < Term::new(vec![0x80]));
    }

    #[test]
    fn test_display_lossy() {
        assert_eq!(Term::from("don't").to_string(), "don't");
        let invalid = Term::new(vec![b'a', 0xff]);
        assert_eq!(invalid.to_string(), "a\u{fffd}");
    }

    #[test]
    fn test_empty() {
        assert!(Term::default().is_empty());
        assert!(!Term::from("a").is_empty());
    }
}
