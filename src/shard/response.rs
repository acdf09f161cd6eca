//! Shard sub-requests and the envelope a shard sends back.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::routing::Preference;
use crate::error::{Result, TermwalkError};
use crate::shard::merge::ShardTermsMerger;
use crate::shard::store::{Shard, ShardId};
use crate::term::Term;

/// The part of a terms enumeration executed by a single shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTermsRequest {
    /// Shard to run on.
    pub shard_id: ShardId,
    /// Field whose terms are enumerated.
    pub field: String,
    /// Inclusive lower bound.
    pub from: Option<Term>,
    /// Maximum number of terms to return.
    pub size: usize,
    /// Minimum summed document frequency within the shard.
    pub min_doc_freq: u64,
    /// Routing preference the shard copy was chosen with.
    pub preference: Option<Preference>,
}

/// Sorted term list produced by one shard.
///
/// The order produced by the shard merge is kept exactly; nothing here
/// re-sorts or deduplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTermsResponse {
    shard_id: ShardId,
    terms: Vec<Term>,
}

impl ShardTermsResponse {
    /// Wrap a shard's merged terms.
    pub fn new(shard_id: ShardId, terms: Vec<Term>) -> Self {
        ShardTermsResponse { shard_id, terms }
    }

    /// Rebuild a response from a flat list of term strings.
    pub fn from_term_strings<S: Into<String>>(
        shard_id: ShardId,
        terms: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            shard_id,
            terms.into_iter().map(|t| Term::from(t.into())).collect(),
        )
    }

    /// The terms as a flat list of strings.
    pub fn to_term_strings(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.to_string()).collect()
    }

    /// Encode for the wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the wire.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Shard that produced the terms.
    pub fn shard_id(&self) -> &ShardId {
        &self.shard_id
    }

    /// The terms, in shard order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the shard returned no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Run a shard request against a shard.
///
/// Term sources are opened fresh for this call and released before
/// returning, whatever the outcome.
pub fn execute_on_shard(shard: &Shard, request: &ShardTermsRequest) -> Result<ShardTermsResponse> {
    if shard.id() != &request.shard_id {
        return Err(TermwalkError::shard(format!(
            "request for shard {} routed to shard {}",
            request.shard_id,
            shard.id()
        )));
    }

    let sources = shard.open_terms(&request.field);
    let mut merger = ShardTermsMerger::new(request.field.as_str(), sources);
    let terms = merger.collect(request.from.as_ref(), request.min_doc_freq, request.size);
    debug!(
        shard = %request.shard_id,
        field = %request.field,
        terms = terms.len(),
        failed_sources = merger.stats().exhausted_on_error,
        "shard request executed"
    );
    drop(merger);

    Ok(ShardTermsResponse::new(request.shard_id.clone(), terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::segment::SegmentWriter;

    fn request(shard_id: ShardId) -> ShardTermsRequest {
        ShardTermsRequest {
            shard_id,
            field: "body".to_string(),
            from: None,
            size: 10,
            min_doc_freq: 0,
            preference: None,
        }
    }

    fn shard() -> Shard {
        let mut first = SegmentWriter::with_id("s0");
        first.add_terms("body", ["be", "don't"]);
        let mut second = SegmentWriter::with_id("s1");
        second.add_terms("body", ["always", "be", "forget"]);
        Shard::from_segments(ShardId::new("idx", 0), vec![first.finish(), second.finish()])
    }

    #[test]
    fn test_execute_on_shard() {
        let shard = shard();
        let response = execute_on_shard(&shard, &request(ShardId::new("idx", 0))).unwrap();

        assert_eq!(response.shard_id(), &ShardId::new("idx", 0));
        assert_eq!(
            response.to_term_strings(),
            vec!["always", "be", "don't", "forget"]
        );
    }

    #[test]
    fn test_execute_with_threshold() {
        let shard = shard();
        let mut req = request(ShardId::new("idx", 0));
        req.min_doc_freq = 2;

        let response = execute_on_shard(&shard, &req).unwrap();
        assert_eq!(response.to_term_strings(), vec!["be"]);
    }

    #[test]
    fn test_wrong_shard_is_rejected() {
        let shard = shard();
        let result = execute_on_shard(&shard, &request(ShardId::new("idx", 1)));
        assert!(matches!(result, Err(TermwalkError::Shard(_))));
    }

    #[test]
    fn test_unknown_field_is_empty() {
        let shard = shard();
        let mut req = request(ShardId::new("idx", 0));
        req.field = "title".to_string();

        let response = execute_on_shard(&shard, &req).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_wire_encoding_keeps_order() {
        // Deliberately unsorted: the envelope must not reorder.
        let response =
            ShardTermsResponse::from_term_strings(ShardId::new("idx", 2), ["be", "always"]);
        let decoded = ShardTermsResponse::decode(&response.encode().unwrap()).unwrap();

        assert_eq!(decoded, response);
        assert_eq!(decoded.to_term_strings(), vec!["be", "always"]);
    }
}
