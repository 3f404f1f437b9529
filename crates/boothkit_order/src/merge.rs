//! Cross-document pipeline orchestration.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate_records;
use crate::cache::{LedgerCache, derive_grid_content_hash};
use crate::cell::{SpecGrid, derive_cell_text};
use crate::composite::BundleCellParser;
use crate::conf::{derive_default_price_table, derive_template_layout};
use crate::meta::extract_booth_meta;
use crate::price::{calculate_line_total, resolve_unit_price};
use crate::report::MergedReport;
use crate::source::{SpecSourceDocument, select_sheet_name};
use crate::spec::{
    EnumCellValue, EnumRowSection, OrderFormError, SpecBoothLedger, SpecDocumentExtraction,
    SpecExtractedRecord, SpecMergeOptions, SpecPriceTable, SpecTemplateLayout,
};
use crate::util::calculate_worker_limit;
use crate::window::extract_raw_rows;

#[derive(Debug)]
enum EnumExtractionOrigin {
    Cached(SpecDocumentExtraction),
    Fresh {
        content_hash: String,
        extraction: SpecDocumentExtraction,
    },
}

type TypeDocumentOutcome = Result<EnumExtractionOrigin, OrderFormError>;

/// Runs the extraction pipeline over a batch of documents and merges the
/// results in upload order.
///
/// Holds the template layout, keyword parser and price table fixed for its
/// lifetime, plus a content-hash cache the owner may clear at any time.
#[derive(Debug, Clone)]
pub struct OrderFormMerger {
    options: SpecMergeOptions,
    layout: SpecTemplateLayout,
    parser: BundleCellParser,
    price_table: SpecPriceTable,
    cache: LedgerCache,
}

impl OrderFormMerger {
    pub fn new(
        options: SpecMergeOptions,
        price_table: SpecPriceTable,
        parser: BundleCellParser,
    ) -> Self {
        Self {
            layout: derive_template_layout(options.profile),
            options,
            parser,
            price_table,
            cache: LedgerCache::new(),
        }
    }

    /// Merger with the default keyword set and catalog price table.
    pub fn with_defaults(options: SpecMergeOptions) -> Result<Self, String> {
        Ok(Self::new(
            options,
            derive_default_price_table(),
            BundleCellParser::with_default_keywords()?,
        ))
    }

    pub fn options(&self) -> &SpecMergeOptions {
        &self.options
    }

    pub fn layout(&self) -> &SpecTemplateLayout {
        &self.layout
    }

    pub fn cache(&self) -> &LedgerCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut LedgerCache {
        &mut self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Extract one grid with no caching and no zero-quantity policy.
    pub fn extract_grid(&self, grid: &SpecGrid) -> Result<SpecDocumentExtraction, String> {
        let meta = extract_booth_meta(grid, &self.layout)?;
        let l_rows = extract_raw_rows(grid, &self.layout)?;

        let mut l_records = Vec::with_capacity(l_rows.len());
        for row in &l_rows {
            let c_row_name = derive_cell_text(&row.cell_name);
            let c_note = derive_cell_text(&row.cell_note);
            let l_pairs =
                self.parser
                    .expand(&row.cell_name, row.cell_qty_requested(), &self.layout.bundle_rule);

            for (item_name, quantity) in l_pairs {
                // Addenda prices cover every pair of the row; catalog prices only
                // the row's own item.
                let cell_price = if row.section == EnumRowSection::Addenda
                    || item_name == c_row_name
                {
                    &row.cell_price
                } else {
                    &EnumCellValue::None
                };
                let (unit_price, if_price_explicit) =
                    resolve_unit_price(&self.price_table, &item_name, cell_price);
                l_records.push(SpecExtractedRecord {
                    line_total: calculate_line_total(quantity, unit_price),
                    item_name,
                    quantity,
                    unit_price,
                    note: c_note.clone(),
                    section: row.section,
                    row_idx: row.row_idx,
                    if_price_explicit,
                });
            }
        }

        let ledger = aggregate_records(&l_records, &self.options.note_separator);
        Ok(SpecDocumentExtraction {
            meta,
            ledger,
            records: l_records,
        })
    }

    /// Resolve the sheet of one document and materialize its grid.
    pub fn load_grid(&self, document: &SpecSourceDocument) -> Result<SpecGrid, OrderFormError> {
        let malformed = |reason: String| OrderFormError::MalformedDocument {
            document: document.name.clone(),
            reason,
        };
        let c_sheet_name =
            select_sheet_name(document.source.as_ref(), &self.layout.sheet_name).map_err(malformed)?;
        if c_sheet_name != self.layout.sheet_name {
            debug!(
                document = %document.name,
                sheet = %c_sheet_name,
                "preferred sheet missing; using first sheet"
            );
        }
        document.source.read_grid(&c_sheet_name).map_err(malformed)
    }

    /// Extract one document, consulting the cache read-only.
    pub fn extract_document(
        &self,
        document: &SpecSourceDocument,
    ) -> Result<SpecDocumentExtraction, OrderFormError> {
        match self.run_document(document)? {
            EnumExtractionOrigin::Cached(extraction) => Ok(extraction),
            EnumExtractionOrigin::Fresh { extraction, .. } => Ok(extraction),
        }
    }

    fn run_document(&self, document: &SpecSourceDocument) -> TypeDocumentOutcome {
        let grid = self.load_grid(document)?;
        let content_hash = derive_grid_content_hash(&grid, self.layout.profile);
        if let Some(extraction) = self.cache.get(&content_hash) {
            return Ok(EnumExtractionOrigin::Cached(extraction.clone()));
        }

        let extraction =
            self.extract_grid(&grid)
                .map_err(|reason| OrderFormError::MalformedDocument {
                    document: document.name.clone(),
                    reason,
                })?;
        Ok(EnumExtractionOrigin::Fresh {
            content_hash,
            extraction,
        })
    }

    fn run_documents(&self, documents: &[SpecSourceDocument]) -> Vec<TypeDocumentOutcome> {
        let run = |document: &SpecSourceDocument| self.run_document(document);

        let n_workers_max = calculate_worker_limit(self.options.num_workers_max);
        if n_workers_max <= 1 || documents.len() <= 1 {
            return documents.iter().map(run).collect();
        }

        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => thread_pool.install(|| documents.par_iter().map(run).collect()),
            Err(err) => {
                warn!(
                    workers = n_workers_max,
                    "failed to initialize thread pool ({err}); fallback to serial extraction"
                );
                documents.iter().map(run).collect()
            }
        }
    }

    fn apply_zero_quantity_policy(
        &self,
        mut extraction: SpecDocumentExtraction,
    ) -> Option<SpecDocumentExtraction> {
        if self.options.if_include_zero_quantity {
            return Some(extraction);
        }
        extraction.ledger.items.retain(|item| item.quantity > 0);
        extraction.records.retain(|record| record.quantity > 0);
        if extraction.ledger.is_empty() {
            return None;
        }
        Some(extraction)
    }

    /// Run every document and merge the successes in upload order.
    ///
    /// Failed documents are excluded entirely and reported as warnings.
    /// Returns [`OrderFormError::EmptyBatch`] when `documents` is empty or
    /// every document failed.
    pub fn merge_all(
        &mut self,
        documents: &[SpecSourceDocument],
    ) -> Result<MergedReport, OrderFormError> {
        if documents.is_empty() {
            return Err(OrderFormError::EmptyBatch { warnings: vec![] });
        }
        info!(
            documents = documents.len(),
            profile = %self.layout.profile,
            "merging order forms"
        );

        let l_outcomes = self.run_documents(documents);
        let mut report = MergedReport::default();

        for (document, outcome) in documents.iter().zip(l_outcomes) {
            let extraction = match outcome {
                Ok(EnumExtractionOrigin::Cached(extraction)) => {
                    self.cache.record_hit();
                    debug!(document = %document.name, "cache hit");
                    extraction
                }
                Ok(EnumExtractionOrigin::Fresh {
                    content_hash,
                    extraction,
                }) => {
                    self.cache.record_miss();
                    self.cache.insert(content_hash, extraction.clone());
                    extraction
                }
                Err(err) => {
                    warn!(document = %document.name, "document skipped: {err}");
                    report.warnings.extend(err.to_warning());
                    continue;
                }
            };

            let Some(extraction) = self.apply_zero_quantity_policy(extraction) else {
                debug!(document = %document.name, "no non-zero items; document dropped");
                report.documents_empty.push(document.name.clone());
                continue;
            };

            debug!(
                document = %document.name,
                items = extraction.ledger.len(),
                "document extracted"
            );
            report.documents.push(SpecBoothLedger {
                document: document.name.clone(),
                meta: extraction.meta,
                ledger: extraction.ledger,
                records: extraction.records,
            });
        }

        if report.warnings.len() == documents.len() {
            return Err(OrderFormError::EmptyBatch {
                warnings: report.warnings,
            });
        }

        info!("{}", report.format("[MERGE]"));
        Ok(report)
    }
}
