//! Shard-level k-way merge of segment term sources.
//!
//! Every segment of a shard contributes one sorted [`TermsEnum`]. The merger
//! keeps one cursor per source and repeatedly takes the smallest positioned
//! term as the next candidate. Only sources sitting on the previous candidate
//! are advanced, so every source is read strictly forward and each distinct
//! term is considered exactly once. A candidate is emitted when the sum of
//! its per-segment document frequencies reaches `min_doc_freq`.
//!
//! A source that fails to read is logged and treated as exhausted; the shard
//! carries on with its remaining sources.

use tracing::{debug, warn};

use crate::error::TermwalkError;
use crate::lexical::terms::TermsEnum;
use crate::term::Term;

/// Position of one source within the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Positioned(Term),
    Exhausted,
}

struct SourceCursor {
    source: Box<dyn TermsEnum>,
    state: CursorState,
}

impl SourceCursor {
    fn term(&self) -> Option<&Term> {
        match &self.state {
            CursorState::Positioned(term) => Some(term),
            CursorState::Exhausted => None,
        }
    }
}

/// Counters describing one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of term sources merged.
    pub sources: usize,
    /// Sources dropped because reading them failed.
    pub exhausted_on_error: usize,
    /// Distinct terms considered, emitted or not.
    pub candidates_examined: u64,
    /// Terms emitted.
    pub terms_emitted: usize,
}

/// Merges the term sources of one shard into a sorted, deduplicated,
/// frequency-filtered and size-bounded term list.
pub struct ShardTermsMerger {
    field: String,
    cursors: Vec<SourceCursor>,
    stats: MergeStats,
}

impl ShardTermsMerger {
    /// Create a merger owning `sources`; they are released when it is dropped.
    pub fn new(field: impl Into<String>, sources: Vec<Box<dyn TermsEnum>>) -> Self {
        let cursors: Vec<_> = sources
            .into_iter()
            .map(|source| SourceCursor {
                source,
                state: CursorState::Exhausted,
            })
            .collect();
        let stats = MergeStats {
            sources: cursors.len(),
            ..Default::default()
        };

        ShardTermsMerger {
            field: field.into(),
            cursors,
            stats,
        }
    }

    /// Run the merge.
    ///
    /// With `from` set, each source starts at its first term `>= from`, so a
    /// term equal to the cursor is included.
    pub fn collect(&mut self, from: Option<&Term>, min_doc_freq: u64, size: usize) -> Vec<Term> {
        let mut terms = Vec::new();
        if size == 0 {
            return terms;
        }

        self.position(from);

        let mut candidate = self.min_term();
        while let Some(term) = candidate {
            self.stats.candidates_examined += 1;

            if self.doc_freq(&term) >= min_doc_freq {
                terms.push(term.clone());
                if terms.len() >= size {
                    break;
                }
            }

            self.advance_past(&term);
            candidate = self.min_term();
        }

        self.stats.terms_emitted = terms.len();
        debug!(
            field = %self.field,
            sources = self.stats.sources,
            examined = self.stats.candidates_examined,
            emitted = terms.len(),
            "shard terms merged"
        );
        terms
    }

    /// Counters of the last run.
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    fn position(&mut self, from: Option<&Term>) {
        for index in 0..self.cursors.len() {
            let source = &mut self.cursors[index].source;
            let read = match from {
                Some(from) => source.seek_ceiling(from),
                None => source.next(),
            };
            let state = match read {
                Ok(Some(term)) if !term.is_empty() => CursorState::Positioned(term),
                Ok(_) => CursorState::Exhausted,
                Err(e) => {
                    self.fail(index, e);
                    CursorState::Exhausted
                }
            };
            self.cursors[index].state = state;
        }
    }

    /// Move every source sitting on `term` to its next term.
    fn advance_past(&mut self, term: &Term) {
        for index in 0..self.cursors.len() {
            if self.cursors[index].term() != Some(term) {
                continue;
            }

            let state = match self.cursors[index].source.next() {
                Ok(Some(next)) if next > *term => CursorState::Positioned(next),
                Ok(Some(next)) => {
                    warn!(
                        field = %self.field,
                        source = index,
                        previous = %term,
                        next = %next,
                        "term source went backwards, treating it as exhausted"
                    );
                    CursorState::Exhausted
                }
                Ok(None) => CursorState::Exhausted,
                Err(e) => {
                    self.fail(index, e);
                    CursorState::Exhausted
                }
            };
            self.cursors[index].state = state;
        }
    }

    fn min_term(&self) -> Option<Term> {
        self.cursors.iter().filter_map(SourceCursor::term).min().cloned()
    }

    fn doc_freq(&self, term: &Term) -> u64 {
        self.cursors
            .iter()
            .filter(|cursor| cursor.term() == Some(term))
            .fold(0u64, |sum, cursor| {
                sum.saturating_add(cursor.source.current_frequency())
            })
    }

    fn fail(&mut self, index: usize, error: TermwalkError) {
        self.stats.exhausted_on_error += 1;
        warn!(
            field = %self.field,
            source = index,
            error = %error,
            "failed to read term source, treating it as exhausted"
        );
    }
}

/// Merge `sources` for one field in a single call.
pub fn merge_shard_terms(
    field: &str,
    sources: Vec<Box<dyn TermsEnum>>,
    from: Option<&Term>,
    min_doc_freq: u64,
    size: usize,
) -> Vec<Term> {
    ShardTermsMerger::new(field, sources).collect(from, min_doc_freq, size)
}
