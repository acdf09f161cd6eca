//! Cluster-level merge of per-shard term lists.
//!
//! Each shard already returns a sorted, deduplicated and bounded list, so the
//! cluster tier is a plain streaming k-way merge: keep one read index per
//! shard, step every shard sitting on the last emitted term, and emit the
//! smallest remaining head. Frequencies are not known here and are not
//! re-checked; the shard-level filtering is authoritative.

use crate::shard::response::ShardTermsResponse;
use crate::term::Term;

/// Merge sorted per-shard term lists into one sorted, deduplicated list of
/// at most `size` terms.
///
/// ```
/// use termwalk::cluster::merger::merge_sorted_terms;
/// use termwalk::term::Term;
///
/// let a = vec![Term::from("always"), Term::from("be")];
/// let b = vec![Term::from("be"), Term::from("careful")];
/// let merged = merge_sorted_terms(&[a, b], 10);
/// assert_eq!(merged, vec![Term::from("always"), Term::from("be"), Term::from("careful")]);
/// ```
pub fn merge_sorted_terms<S: AsRef<[Term]>>(shard_terms: &[S], size: usize) -> Vec<Term> {
    let lists: Vec<&[Term]> = shard_terms.iter().map(AsRef::as_ref).collect();
    let mut positions = vec![0usize; lists.len()];
    let mut merged: Vec<Term> = Vec::with_capacity(size.min(64));

    while merged.len() < size {
        if let Some(last) = merged.last() {
            for (list, position) in lists.iter().zip(positions.iter_mut()) {
                // Equal heads are the same term reported by another shard.
                while list.get(*position).is_some_and(|head| head <= last) {
                    *position += 1;
                }
            }
        }

        let next = lists
            .iter()
            .zip(positions.iter())
            .filter_map(|(list, position)| list.get(*position))
            .min();

        match next {
            Some(term) => merged.push(term.clone()),
            None => break,
        }
    }

    merged
}

/// Merges shard responses into the final cluster result.
#[derive(Debug, Clone, Copy)]
pub struct ClusterTermsMerger {
    size: usize,
}

impl ClusterTermsMerger {
    /// Create a merger producing at most `size` terms.
    pub fn new(size: usize) -> Self {
        ClusterTermsMerger { size }
    }

    /// Merge the responses of every shard that replied.
    pub fn merge(&self, responses: &[ShardTermsResponse]) -> Vec<Term> {
        let lists: Vec<&[Term]> = responses.iter().map(ShardTermsResponse::terms).collect();
        merge_sorted_terms(&lists, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::store::ShardId;

    fn terms(values: &[&str]) -> Vec<Term> {
        values.iter().map(|v| Term::from(*v)).collect()
    }

    #[test]
    fn test_duplicate_across_shards_emitted_once() {
        let merged = merge_sorted_terms(&[terms(&["always", "be"]), terms(&["be", "careful"])], 10);
        assert_eq!(merged, terms(&["always", "be", "careful"]));
    }

    #[test]
    fn test_size_bound() {
        let merged = merge_sorted_terms(
            &[terms(&["a", "c", "e"]), terms(&["b", "d", "f"])],
            4,
        );
        assert_eq!(merged, terms(&["a", "b", "c", "d"]));

        let merged = merge_sorted_terms(&[terms(&["a"])], 0);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let none: Vec<Vec<Term>> = Vec::new();
        assert!(merge_sorted_terms(&none, 10).is_empty());

        let merged = merge_sorted_terms(&[Vec::new(), terms(&["x"]), Vec::new()], 10);
        assert_eq!(merged, terms(&["x"]));
    }

    #[test]
    fn test_same_list_on_every_shard() {
        let list = terms(&["always", "be", "careful"]);
        let merged = merge_sorted_terms(&[list.clone(), list.clone(), list.clone()], 10);
        assert_eq!(merged, list);
    }

    #[test]
    fn test_one_shard_exhausts_early() {
        let merged = merge_sorted_terms(
            &[terms(&["a"]), terms(&["a", "b", "c"]), terms(&["c", "d"])],
            10,
        );
        assert_eq!(merged, terms(&["a", "b", "c", "d"]));
    }

    #[test]
    fn test_merge_responses() {
        let responses = vec![
            ShardTermsResponse::from_term_strings(ShardId::new("idx", 0), ["always", "be"]),
            ShardTermsResponse::from_term_strings(ShardId::new("idx", 1), ["be", "careful"]),
        ];
        let merged = ClusterTermsMerger::new(10).merge(&responses);
        assert_eq!(merged, terms(&["always", "be", "careful"]));

        let merged = ClusterTermsMerger::new(1).merge(&responses);
        assert_eq!(merged, terms(&["always"]));
    }
}
