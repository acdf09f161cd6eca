//! Immutable on-disk segments holding one term dictionary per field.
//!
//! File layout (little-endian):
//!
//! ```text
//! magic: u32 ("TWSG") | version: u32 | payload_len: u64 | crc32: u32 | payload
//! ```
//!
//! The payload is the bincode encoding of the segment id, its document count
//! and the per-field dictionaries.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TermwalkError};
use crate::lexical::analyzer::UnicodeWordAnalyzer;
use crate::lexical::dictionary::{SortedTermDictionary, TermDictionaryBuilder, TermInfo};
use crate::lexical::terms::{DictionaryTermsEnum, TermsEnum};
use crate::term::Term;

const SEGMENT_MAGIC: u32 = 0x54575347; // "TWSG"
const SEGMENT_VERSION: u32 = 1;

/// File extension of segment files.
pub const SEGMENT_EXTENSION: &str = "seg";

#[derive(Serialize, Deserialize)]
struct SegmentPayload {
    segment_id: String,
    doc_count: u64,
    fields: BTreeMap<String, SortedTermDictionary>,
}

/// Accumulates documents and writes them out as a single segment.
#[derive(Debug)]
pub struct SegmentWriter {
    id: String,
    doc_count: u64,
    analyzer: UnicodeWordAnalyzer,
    fields: BTreeMap<String, TermDictionaryBuilder>,
}

impl SegmentWriter {
    /// Create a writer for a new segment with a random id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Create a writer for a segment with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        SegmentWriter {
            id: id.into(),
            doc_count: 0,
            analyzer: UnicodeWordAnalyzer::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Use a custom analyzer for subsequent documents.
    pub fn with_analyzer(mut self, analyzer: UnicodeWordAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Analyze and add one document given as (field, text) pairs.
    pub fn add_document<I, F, T>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (F, T)>,
        F: Into<String>,
        T: AsRef<str>,
    {
        let mut per_field: BTreeMap<String, AHashMap<Term, u64>> = BTreeMap::new();
        for (field, text) in fields {
            let counts = per_field.entry(field.into()).or_default();
            for term in self.analyzer.terms(text.as_ref()) {
                *counts.entry(term).or_insert(0) += 1;
            }
        }

        for (field, counts) in per_field {
            let builder = self.fields.entry(field).or_default();
            for (term, occurrences) in counts {
                builder.add_term(term, TermInfo::new(1, occurrences));
            }
        }
        self.doc_count += 1;
    }

    /// Add already-analyzed terms of one document to a field.
    ///
    /// Each distinct term counts once towards its document frequency.
    pub fn add_terms<T: Into<Term>>(&mut self, field: &str, terms: impl IntoIterator<Item = T>) {
        let builder = self.fields.entry(field.to_string()).or_default();
        let mut seen = HashSet::new();
        for term in terms {
            let term = term.into();
            if seen.insert(term.clone()) {
                builder.add_term(term, TermInfo::new(1, 1));
            }
        }
        self.doc_count += 1;
    }

    /// Segment id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of documents added so far.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    fn into_payload(self) -> SegmentPayload {
        SegmentPayload {
            segment_id: self.id,
            doc_count: self.doc_count,
            fields: self
                .fields
                .into_iter()
                .map(|(field, builder)| (field, builder.build()))
                .collect(),
        }
    }

    /// Build an in-memory segment without touching disk.
    pub fn finish(self) -> SegmentReader {
        SegmentReader::from_payload(self.into_payload())
    }

    /// Write the segment into `dir` and return the path of the new file.
    pub fn write_to_dir(self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("segment_{}.{}", self.id, SEGMENT_EXTENSION));
        let payload = bincode::serialize(&self.into_payload())?;

        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_u32::<LittleEndian>(SEGMENT_MAGIC)?;
        writer.write_u32::<LittleEndian>(SEGMENT_VERSION)?;
        writer.write_u64::<LittleEndian>(payload.len() as u64)?;
        writer.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        writer.write_all(&payload)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        Ok(path)
    }
}

impl Default for SegmentWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one segment.
#[derive(Debug, Clone)]
pub struct SegmentReader {
    id: String,
    doc_count: u64,
    fields: AHashMap<String, Arc<SortedTermDictionary>>,
}

impl SegmentReader {
    fn from_payload(payload: SegmentPayload) -> Self {
        SegmentReader {
            id: payload.segment_id,
            doc_count: payload.doc_count,
            fields: payload
                .fields
                .into_iter()
                .map(|(field, dict)| (field, Arc::new(dict)))
                .collect(),
        }
    }

    /// Open and verify a segment file.
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);

        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != SEGMENT_MAGIC {
            return Err(TermwalkError::storage(format!(
                "Invalid segment magic number in {}",
                path.display()
            )));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version != SEGMENT_VERSION {
            return Err(TermwalkError::storage(format!(
                "Unsupported segment version {version} in {}",
                path.display()
            )));
        }

        let payload_len = reader.read_u64::<LittleEndian>()?;
        let checksum = reader.read_u32::<LittleEndian>()?;

        let mut payload = Vec::new();
        reader.read_to_end(&mut payload)?;
        if payload.len() as u64 != payload_len {
            return Err(TermwalkError::storage(format!(
                "Truncated segment {}: expected {payload_len} payload bytes, found {}",
                path.display(),
                payload.len()
            )));
        }
        if crc32fast::hash(&payload) != checksum {
            return Err(TermwalkError::storage(format!(
                "Checksum mismatch in segment {}",
                path.display()
            )));
        }

        let payload: SegmentPayload = bincode::deserialize(&payload)?;
        for (field, dict) in &payload.fields {
            if !dict.is_consistent() {
                return Err(TermwalkError::storage(format!(
                    "Dictionary for field [{field}] in {} has mismatched term and info counts",
                    path.display()
                )));
            }
            let sorted = dict
                .iter()
                .zip(dict.iter().skip(1))
                .all(|((a, _), (b, _))| a < b);
            if !sorted {
                return Err(TermwalkError::storage(format!(
                    "Dictionary for field [{field}] in {} is not strictly sorted",
                    path.display()
                )));
            }
        }

        Ok(Self::from_payload(payload))
    }

    /// Segment id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of documents in the segment.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Names of the fields that have at least one term.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Dictionary of a field, if the segment has it.
    pub fn dictionary(&self, field: &str) -> Option<&Arc<SortedTermDictionary>> {
        self.fields.get(field)
    }

    /// A fresh, unpositioned term source over `field`.
    pub fn terms(&self, field: &str) -> Option<Box<dyn TermsEnum>> {
        self.fields
            .get(field)
            .map(|dict| Box::new(DictionaryTermsEnum::new(Arc::clone(dict))) as Box<dyn TermsEnum>)
    }
}
