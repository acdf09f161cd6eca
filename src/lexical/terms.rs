//! Term dictionary enumeration API.
//!
//! A [`TermsEnum`] is a sorted cursor over one segment's terms for one field,
//! similar to Lucene's TermsEnum. The shard merge engine owns one enum per
//! segment for the duration of a single enumeration call; dropping the enum
//! releases whatever it holds.

use std::sync::Arc;

use crate::error::Result;
use crate::lexical::dictionary::SortedTermDictionary;
use crate::term::Term;

/// Sorted iterator over the terms of a field in one segment.
///
/// Before the first call to [`next`](TermsEnum::next) or
/// [`seek_ceiling`](TermsEnum::seek_ceiling) the enum is unpositioned and
/// [`current`](TermsEnum::current) returns `None`.
pub trait TermsEnum: Send {
    /// Position on the first term greater than or equal to `target`.
    ///
    /// Returns the term positioned on, or `None` if every term is smaller.
    fn seek_ceiling(&mut self, target: &Term) -> Result<Option<Term>>;

    /// Advance to the next term in the enumeration.
    ///
    /// On an unpositioned enum this positions on the first term. Returns
    /// `None` when there are no more terms.
    fn next(&mut self) -> Result<Option<Term>>;

    /// The term the enum is currently positioned on.
    fn current(&self) -> Option<&Term>;

    /// Document frequency of the current term within this segment.
    ///
    /// Zero when unpositioned or exhausted.
    fn current_frequency(&self) -> u64;
}

impl TermsEnum for Box<dyn TermsEnum> {
    fn seek_ceiling(&mut self, target: &Term) -> Result<Option<Term>> {
        (**self).seek_ceiling(target)
    }

    fn next(&mut self) -> Result<Option<Term>> {
        (**self).next()
    }

    fn current(&self) -> Option<&Term> {
        (**self).current()
    }

    fn current_frequency(&self) -> u64 {
        (**self).current_frequency()
    }
}

/// Where a [`DictionaryTermsEnum`] currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Unpositioned,
    At(usize),
    End,
}

/// [`TermsEnum`] over an in-memory [`SortedTermDictionary`].
#[derive(Debug, Clone)]
pub struct DictionaryTermsEnum {
    dict: Arc<SortedTermDictionary>,
    position: Position,
}

impl DictionaryTermsEnum {
    /// Create an unpositioned enum over a dictionary.
    pub fn new(dict: Arc<SortedTermDictionary>) -> Self {
        DictionaryTermsEnum {
            dict,
            position: Position::Unpositioned,
        }
    }

    fn move_to(&mut self, position: usize) -> Option<Term> {
        match self.dict.entry(position) {
            Some((term, _)) => {
                self.position = Position::At(position);
                Some(term.clone())
            }
            None => {
                self.position = Position::End;
                None
            }
        }
    }
}

impl TermsEnum for DictionaryTermsEnum {
    fn seek_ceiling(&mut self, target: &Term) -> Result<Option<Term>> {
        let position = self.dict.ceiling_position(target);
        Ok(self.move_to(position))
    }

    fn next(&mut self) -> Result<Option<Term>> {
        let next = match self.position {
            Position::Unpositioned => 0,
            Position::At(pos) => pos + 1,
            Position::End => return Ok(None),
        };
        Ok(self.move_to(next))
    }

    fn current(&self) -> Option<&Term> {
        match self.position {
            Position::At(pos) => self.dict.entry(pos).map(|(term, _)| term),
            _ => None,
        }
    }

    fn current_frequency(&self) -> u64 {
        match self.position {
            Position::At(pos) => self
                .dict
                .entry(pos)
                .map(|(_, info)| info.doc_frequency)
                .unwrap_or(0),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::dictionary::{TermDictionaryBuilder, TermInfo};

    fn terms_enum(terms: &[(&str, u64)]) -> DictionaryTermsEnum {
        let mut builder = TermDictionaryBuilder::new();
        for (term, df) in terms {
            builder.add_term(Term::from(*term), TermInfo::new(*df, *df));
        }
        DictionaryTermsEnum::new(Arc::new(builder.build()))
    }

    #[test]
    fn test_next_walks_in_order() {
        let mut iter = terms_enum(&[("be", 1), ("always", 2), ("forget", 1)]);
        assert!(iter.current().is_none());
        assert_eq!(iter.current_frequency(), 0);

        assert_eq!(iter.next().unwrap(), Some(Term::from("always")));
        assert_eq!(iter.current_frequency(), 2);
        assert_eq!(iter.next().unwrap(), Some(Term::from("be")));
        assert_eq!(iter.next().unwrap(), Some(Term::from("forget")));
        assert_eq!(iter.next().unwrap(), None);
        assert!(iter.current().is_none());
        assert_eq!(iter.next().unwrap(), None);
    }

    #[test]
    fn test_seek_ceiling() {
        let mut iter = terms_enum(&[("always", 1), ("be", 1), ("forget", 3)]);

        assert_eq!(
            iter.seek_ceiling(&Term::from("be")).unwrap(),
            Some(Term::from("be"))
        );
        assert_eq!(iter.current(), Some(&Term::from("be")));

        assert_eq!(
            iter.seek_ceiling(&Term::from("careful")).unwrap(),
            Some(Term::from("forget"))
        );
        assert_eq!(iter.current_frequency(), 3);

        assert_eq!(iter.seek_ceiling(&Term::from("zebra")).unwrap(), None);
        assert!(iter.current().is_none());
    }

    #[test]
    fn test_next_after_seek() {
        let mut iter = terms_enum(&[("always", 1), ("be", 1), ("forget", 1)]);
        iter.seek_ceiling(&Term::from("b")).unwrap();
        assert_eq!(iter.next().unwrap(), Some(Term::from("forget")));
    }

    #[test]
    fn test_empty_dictionary() {
        let mut iter = terms_enum(&[]);
        assert_eq!(iter.next().unwrap(), None);
        assert_eq!(iter.seek_ceiling(&Term::from("a")).unwrap(), None);
    }
}
