use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use termwalk::cluster::merge_sorted_terms;
use termwalk::lexical::segment::SegmentWriter;
use termwalk::shard::{Shard, ShardId, merge_shard_terms};
use termwalk::term::Term;

const FIELD: &str = "body";

/// Random shards: each segment holds a random subset of a small vocabulary.
fn random_shards(rng: &mut StdRng) -> (Vec<Shard>, Vec<BTreeMap<Term, u64>>) {
    let vocabulary: Vec<String> = (0..40).map(|n| format!("t{n:02}")).collect();
    let shard_count = rng.random_range(1..5);

    let mut shards = Vec::new();
    let mut frequencies = Vec::new();
    for shard in 0..shard_count {
        let mut doc_freq: BTreeMap<Term, u64> = BTreeMap::new();
        let mut segments = Vec::new();
        for _ in 0..rng.random_range(0..4) {
            let mut writer = SegmentWriter::new();
            for _ in 0..rng.random_range(1..6) {
                let doc: BTreeSet<&String> = (0..rng.random_range(0..8))
                    .map(|_| &vocabulary[rng.random_range(0..vocabulary.len())])
                    .collect();
                for term in &doc {
                    *doc_freq.entry(Term::from(term.as_str())).or_insert(0) += 1;
                }
                writer.add_terms(FIELD, doc.into_iter().map(|t| t.as_str()));
            }
            segments.push(writer.finish());
        }
        shards.push(Shard::from_segments(ShardId::new("random", shard), segments));
        frequencies.push(doc_freq);
    }
    (shards, frequencies)
}

#[test]
fn test_two_tier_merge_matches_oracle() {
    let mut rng = StdRng::seed_from_u64(0x7e57);

    for _ in 0..200 {
        let (shards, frequencies) = random_shards(&mut rng);
        let min_doc_freq = rng.random_range(0..4);
        let size = rng.random_range(1..30);
        let from = rng
            .random_bool(0.5)
            .then(|| Term::from(format!("t{:02}", rng.random_range(0..45)).as_str()));

        let shard_lists: Vec<Vec<Term>> = shards
            .iter()
            .map(|shard| merge_shard_terms(FIELD, shard.open_terms(FIELD), from.as_ref(), min_doc_freq, size))
            .collect();
        let merged = merge_sorted_terms(&shard_lists, size);

        // Threshold applies within each shard; the union is then bounded.
        let expected: Vec<Term> = frequencies
            .iter()
            .flat_map(|freqs| {
                freqs
                    .iter()
                    .filter(|(_, df)| **df >= min_doc_freq)
                    .map(|(term, _)| term.clone())
            })
            .filter(|term| from.as_ref().is_none_or(|from| term >= from))
            .collect::<BTreeSet<Term>>()
            .into_iter()
            .take(size)
            .collect();

        assert_eq!(merged, expected);
        assert!(merged.windows(2).all(|w| w[0] < w[1]));
        for list in &shard_lists {
            assert!(list.len() <= size);
            assert!(list.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
