//! `boothkit_order` v1:
//! Booth order-form extraction and consolidation engine.
//!
//! Pipeline stages, leaves first:
//! - `cell`      : grid model and cell rendering
//! - `coerce`    : loose quantity coercion
//! - `meta`      : fixed-position exhibitor metadata
//! - `composite` : bundle-cell decomposition
//! - `window`    : catalog/addenda row slicing
//! - `price`     : unit prices and line totals
//! - `aggregate` : per-document ledger grouping
//! - `merge`     : cross-document orchestration
//! - `cache`     : content-hash result cache
//! - `report`    : merged report, pivot and output tables
//! - `source`    : spreadsheet source interface
//! - `conf`/`spec`: presets, models, options and errors

pub mod aggregate;
pub mod cache;
pub mod cell;
pub mod coerce;
pub mod composite;
pub mod conf;
pub mod merge;
pub mod meta;
pub mod price;
pub mod report;
pub mod source;
pub mod spec;
mod util;
pub mod window;

pub use aggregate::aggregate_records;
pub use cache::{LedgerCache, derive_grid_content_hash};
pub use cell::{SpecGrid, derive_cell_text, is_blank_cell};
pub use coerce::{coerce_quantity, sum_digit_runs};
pub use composite::BundleCellParser;
pub use conf::{
    C_COMPANY_PLACEHOLDER, C_ORDER_SHEET_NAME, C_SHEET_DETAIL, C_SHEET_LEDGER, C_SHEET_PIVOT,
    TUP_BUNDLE_KEYWORDS, derive_default_merge_options, derive_default_price_table,
    derive_template_layout,
};
pub use merge::OrderFormMerger;
pub use meta::{extract_booth_meta, validate_grid_dimensions};
pub use price::{calculate_line_total, parse_explicit_price, resolve_unit_price};
pub use report::{MergedReport, ReportSink, SpecNamedTable, SpecPivot};
pub use source::{SpecMemorySource, SpecSourceDocument, SpreadsheetSource, select_sheet_name};
pub use spec::{
    EnumCellValue, EnumRowSection, EnumTemplateProfile, OrderFormError, SpecBoothLedger,
    SpecBoothMeta, SpecDocumentExtraction, SpecDocumentWarning, SpecExtractedRecord,
    SpecItemRecord, SpecLedger, SpecMergeOptions, SpecPriceTable, SpecRawRow, SpecTemplateLayout,
    TypeCellCoord,
};
pub use window::extract_raw_rows;
