//! Shard identity and the segments a shard serves.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::lexical::segment::{SEGMENT_EXTENSION, SegmentReader};
use crate::lexical::terms::TermsEnum;

/// Identifies one shard of one index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShardId {
    /// Index name.
    pub index: String,
    /// Shard number within the index.
    pub shard: u32,
}

impl ShardId {
    /// Create a new shard id.
    pub fn new(index: impl Into<String>, shard: u32) -> Self {
        ShardId {
            index: index.into(),
            shard,
        }
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.index, self.shard)
    }
}

/// A consistent snapshot of the segments of one shard.
#[derive(Debug, Clone)]
pub struct Shard {
    id: ShardId,
    segments: Vec<Arc<SegmentReader>>,
}

impl Shard {
    /// Create a shard from already opened segments.
    pub fn from_segments(id: ShardId, segments: Vec<SegmentReader>) -> Self {
        Shard {
            id,
            segments: segments.into_iter().map(Arc::new).collect(),
        }
    }

    /// Open every segment file in `dir`.
    ///
    /// A missing directory is an empty shard; an unreadable segment is an error.
    pub fn open(id: ShardId, dir: &Path) -> Result<Self> {
        if !dir.exists() {
            return Ok(Self::from_segments(id, Vec::new()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == SEGMENT_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let segments = paths
            .iter()
            .map(|path| SegmentReader::open(path))
            .collect::<Result<Vec<_>>>()?;
        debug!(shard = %id, segments = segments.len(), "opened shard");

        Ok(Self::from_segments(id, segments))
    }

    /// Shard id.
    pub fn id(&self) -> &ShardId {
        &self.id
    }

    /// Segments of this shard.
    pub fn segments(&self) -> &[Arc<SegmentReader>] {
        &self.segments
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total documents across segments.
    pub fn doc_count(&self) -> u64 {
        self.segments.iter().map(|s| s.doc_count()).sum()
    }

    /// Fresh term sources for `field`, one per segment containing it.
    pub fn open_terms(&self, field: &str) -> Vec<Box<dyn TermsEnum>> {
        self.segments
            .iter()
            .filter_map(|segment| segment.terms(field))
            .collect()
    }
}
