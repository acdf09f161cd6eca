use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use termwalk::cluster::{ClusterService, ClusterState, LocalTransport};
use termwalk::lexical::segment::SegmentWriter;
use termwalk::shard::{Shard, ShardId};
use termwalk::term::Term;
use termwalk::terms_enum::{TermsEnumConfig, TermsEnumCoordinator, TermsEnumRequest};

const INDEX: &str = "articles";

const DOCUMENTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog",
    "A journey of a thousand miles begins with a single step",
    "To be or not to be, that is the question",
    "All that glitters is not gold",
    "The early bird catches the worm",
    "Actions speak louder than words",
    "Fortune favors the bold",
    "Knowledge is power",
];

fn write_index(data_dir: &Path, shards: u32) -> Result<(), Box<dyn std::error::Error>> {
    for shard in 0..shards {
        let dir = data_dir.join(format!("shard_{shard}"));
        // Two segments per shard so both merge tiers are exercised.
        for segment in 0..2u32 {
            let mut writer = SegmentWriter::new();
            for (n, text) in DOCUMENTS.iter().enumerate() {
                if n as u32 % (shards * 2) == shard * 2 + segment {
                    writer.add_document([("body", *text)]);
                }
            }
            writer.write_to_dir(&dir)?;
        }
    }
    Ok(())
}

fn coordinator(data_dir: &Path, shards: u32) -> Result<TermsEnumCoordinator, Box<dyn std::error::Error>> {
    let transport = LocalTransport::new(Some(2))?;
    for shard in 0..shards {
        let id = ShardId::new(INDEX, shard);
        transport.add_shard("local", Shard::open(id, &data_dir.join(format!("shard_{shard}")))?);
    }
    let state = ClusterState::single_node("local", INDEX, shards);
    Ok(TermsEnumCoordinator::new(
        TermsEnumConfig::default(),
        Arc::new(ClusterService::new(state)),
        Arc::new(transport),
    ))
}

fn expected_terms() -> Vec<Term> {
    let vocabulary: BTreeSet<String> = DOCUMENTS
        .iter()
        .flat_map(|text| text.split(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    vocabulary.into_iter().map(Term::from).collect()
}

#[test]
fn test_full_enumeration_from_disk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_index(dir.path(), 3)?;
    let coordinator = coordinator(dir.path(), 3)?;

    let request = TermsEnumRequest::new(INDEX, "body").with_size(1000);
    let response = tokio_test::block_on(coordinator.execute(request))?;

    assert_eq!(response.terms, expected_terms());
    assert_eq!(response.successful_shards, 3);
    Ok(())
}

#[test]
fn test_pagination_visits_every_term_once() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_index(dir.path(), 2)?;
    let coordinator = coordinator(dir.path(), 2)?;

    // Page with an inclusive cursor, dropping the repeated first term.
    let mut collected: Vec<Term> = Vec::new();
    let mut from: Option<Term> = None;
    loop {
        let mut request = TermsEnumRequest::new(INDEX, "body").with_size(5);
        if let Some(cursor) = &from {
            request = request.with_from(cursor.clone());
        }
        let response = tokio_test::block_on(coordinator.execute(request))?;

        let page: Vec<Term> = match &from {
            Some(cursor) => {
                assert_eq!(response.terms.first(), Some(cursor));
                response.terms[1..].to_vec()
            }
            None => response.terms.clone(),
        };
        if page.is_empty() {
            break;
        }
        collected.extend(page);
        from = response.last_term().cloned();
    }

    assert_eq!(collected, expected_terms());
    Ok(())
}

#[test]
fn test_requery_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_index(dir.path(), 2)?;
    let coordinator = coordinator(dir.path(), 2)?;

    let request = TermsEnumRequest::new(INDEX, "body").with_from("g").with_size(7);
    let first = tokio_test::block_on(coordinator.execute(request.clone()))?;
    let second = tokio_test::block_on(coordinator.execute(request))?;

    assert_eq!(first.terms, second.terms);
    assert!(first.terms.iter().all(|t| t.as_bytes() >= b"g".as_slice()));
    Ok(())
}

#[test]
fn test_min_doc_freq_is_per_shard() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_index(dir.path(), 1)?;
    let coordinator = coordinator(dir.path(), 1)?;

    // "the" appears in four documents, "is" in three, "not" in two.
    let request = TermsEnumRequest::new(INDEX, "body").with_min_doc_freq(3).with_size(100);
    let response = tokio_test::block_on(coordinator.execute(request))?;

    assert_eq!(response.term_strings(), vec!["is", "the"]);
    Ok(())
}
