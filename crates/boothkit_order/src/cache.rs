//! Content-addressed cache of per-document extraction results.

use std::collections::HashMap;

use crate::cell::SpecGrid;
use crate::spec::{EnumCellValue, EnumTemplateProfile, SpecDocumentExtraction};

/// Hash a grid together with the profile used to read it.
///
/// Two documents with identical cells under the same profile share a key,
/// whatever their display names.
pub fn derive_grid_content_hash(grid: &SpecGrid, profile: EnumTemplateProfile) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"boothkit.order.v1\0");
    hasher.update(profile.as_str().as_bytes());
    hasher.update(&(grid.height() as u64).to_le_bytes());

    for row in grid.rows() {
        hasher.update(&(row.len() as u64).to_le_bytes());
        for cell in row {
            match cell {
                EnumCellValue::None => {
                    hasher.update(&[0u8]);
                }
                EnumCellValue::Number(n) => {
                    hasher.update(&[1u8]);
                    hasher.update(&n.to_bits().to_le_bytes());
                }
                EnumCellValue::String(s) => {
                    hasher.update(&[2u8]);
                    hasher.update(&(s.len() as u64).to_le_bytes());
                    hasher.update(s.as_bytes());
                }
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

/// Cache owned by [`crate::OrderFormMerger`]; the caller decides when to
/// invalidate it.
#[derive(Debug, Clone, Default)]
pub struct LedgerCache {
    dict_entries: HashMap<String, SpecDocumentExtraction>,
    cnt_hits: u64,
    cnt_misses: u64,
}

impl LedgerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a result without touching the counters.
    pub fn get(&self, content_hash: &str) -> Option<&SpecDocumentExtraction> {
        self.dict_entries.get(content_hash)
    }

    pub(crate) fn record_hit(&mut self) {
        self.cnt_hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.cnt_misses += 1;
    }

    pub fn insert(&mut self, content_hash: String, extraction: SpecDocumentExtraction) {
        self.dict_entries.insert(content_hash, extraction);
    }

    /// Drop one entry; returns whether it existed.
    pub fn invalidate(&mut self, content_hash: &str) -> bool {
        self.dict_entries.remove(content_hash).is_some()
    }

    /// Drop every entry and reset counters.
    pub fn clear(&mut self) {
        self.dict_entries.clear();
        self.cnt_hits = 0;
        self.cnt_misses = 0;
    }

    pub fn len(&self) -> usize {
        self.dict_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_entries.is_empty()
    }

    pub fn cnt_hits(&self) -> u64 {
        self.cnt_hits
    }

    pub fn cnt_misses(&self) -> u64 {
        self.cnt_misses
    }
}
