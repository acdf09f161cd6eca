//! Per-segment sorted term dictionary.
//!
//! Each segment keeps one dictionary per field: a sorted array of terms with a
//! parallel array of [`TermInfo`] entries. Ordered iteration and ceiling
//! lookups both go through binary search on the sorted array.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::term::Term;

/// Information about a term in the dictionary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermInfo {
    /// Document frequency (number of documents containing this term).
    pub doc_frequency: u64,
    /// Total frequency across all documents.
    pub total_frequency: u64,
}

impl TermInfo {
    /// Create new term info.
    pub fn new(doc_frequency: u64, total_frequency: u64) -> Self {
        TermInfo {
            doc_frequency,
            total_frequency,
        }
    }
}

/// A sorted array-based term dictionary for ordered iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortedTermDictionary {
    /// Sorted terms.
    terms: Vec<Term>,
    /// Term info for each term (parallel array).
    term_infos: Vec<TermInfo>,
}

impl SortedTermDictionary {
    /// Create a new empty sorted term dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a map of terms to term info.
    pub fn from_map(map: BTreeMap<Term, TermInfo>) -> Self {
        let mut terms = Vec::with_capacity(map.len());
        let mut term_infos = Vec::with_capacity(map.len());

        for (term, info) in map.into_iter() {
            terms.push(term);
            term_infos.push(info);
        }

        SortedTermDictionary { terms, term_infos }
    }

    /// Look up a term and return its info.
    pub fn get(&self, term: &Term) -> Option<&TermInfo> {
        let index = self.terms.binary_search(term).ok()?;
        self.term_infos.get(index)
    }

    /// Whether every term has exactly one info entry.
    pub fn is_consistent(&self) -> bool {
        self.terms.len() == self.term_infos.len()
    }

    /// Position of the first term greater than or equal to `target`.
    ///
    /// Returns `len()` when every term is smaller than `target`.
    pub fn ceiling_position(&self, target: &Term) -> usize {
        match self.terms.binary_search(target) {
            Ok(pos) => pos,
            Err(pos) => pos,
        }
    }

    /// Entry at a position.
    pub fn entry(&self, position: usize) -> Option<(&Term, &TermInfo)> {
        Some((self.terms.get(position)?, self.term_infos.get(position)?))
    }

    /// Get the number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Get an iterator over all terms in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Term, &TermInfo)> {
        self.terms.iter().zip(self.term_infos.iter())
    }

    /// Get statistics about the dictionary.
    pub fn stats(&self) -> DictionaryStats {
        let term_count = self.terms.len();
        let total_term_length: usize = self.terms.iter().map(|t| t.len()).sum();
        let avg_term_length = if term_count > 0 {
            total_term_length as f64 / term_count as f64
        } else {
            0.0
        };

        DictionaryStats {
            term_count,
            avg_term_length,
            total_doc_frequency: self.term_infos.iter().map(|i| i.doc_frequency).sum(),
            total_term_frequency: self.term_infos.iter().map(|i| i.total_frequency).sum(),
        }
    }
}

/// Builder for creating term dictionaries.
///
/// Terms may be added in any order and repeatedly; info for a repeated term
/// is accumulated.
#[derive(Debug, Default)]
pub struct TermDictionaryBuilder {
    terms: BTreeMap<Term, TermInfo>,
}

impl TermDictionaryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term with its info, summing with any earlier info for the term.
    pub fn add_term(&mut self, term: Term, info: TermInfo) {
        let entry = self.terms.entry(term).or_default();
        entry.doc_frequency += info.doc_frequency;
        entry.total_frequency += info.total_frequency;
    }

    /// Build a sorted term dictionary.
    pub fn build(self) -> SortedTermDictionary {
        SortedTermDictionary::from_map(self.terms)
    }

    /// Get the current number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Dictionary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryStats {
    /// Number of terms.
    pub term_count: usize,
    /// Average term length in bytes.
    pub avg_term_length: f64,
    /// Total document frequency.
    pub total_doc_frequency: u64,
    /// Total term frequency.
    pub total_term_frequency: u64,
}
