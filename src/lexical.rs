//! Segment-level term storage.
//!
//! A segment holds one sorted term dictionary per field. The merge engines
//! only ever see segments through the [`terms::TermsEnum`] cursor.

pub mod analyzer;
pub mod dictionary;
pub mod segment;
pub mod terms;

pub use dictionary::{SortedTermDictionary, TermDictionaryBuilder, TermInfo};
pub use segment::{SegmentReader, SegmentWriter};
pub use terms::{DictionaryTermsEnum, TermsEnum};
