//! Order-form models: cell values, template layouts, records, options and errors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

////////////////////////////////////////////////////////////////////////////////
// #region Cell

/// Raw worksheet cell value as handed over by a [`crate::SpreadsheetSource`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank cell.
    #[default]
    None,
    /// Text cell.
    String(String),
    /// Numeric cell (dates arrive as serial numbers).
    Number(f64),
}

/// Zero-based `(row, col)` coordinate.
pub type TypeCellCoord = (usize, usize);

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TemplateProfiles

/// Known order-form template revisions.
///
/// Each profile is a versioned contract: it fixes the sheet name, the metadata
/// coordinates, the catalog and addenda windows and which bundle parse paths
/// are active. See [`crate::conf::derive_template_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumTemplateProfile {
    /// First revision: catalog only, one item per row.
    Legacy,
    /// Current revision: catalog with price column, addenda rows, both bundle paths.
    #[default]
    AddendaAware,
    /// Revision encoding bundles in the item-name column.
    BundleInName,
    /// Revision encoding bundles in the quantity column, with addenda rows.
    BundleInQuantity,
}

impl EnumTemplateProfile {
    /// All profiles in declaration order.
    pub const ALL: [EnumTemplateProfile; 4] = [
        EnumTemplateProfile::Legacy,
        EnumTemplateProfile::AddendaAware,
        EnumTemplateProfile::BundleInName,
        EnumTemplateProfile::BundleInQuantity,
    ];

    /// Stable snake-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::AddendaAware => "addenda_aware",
            Self::BundleInName => "bundle_in_name",
            Self::BundleInQuantity => "bundle_in_quantity",
        }
    }
}

impl fmt::Display for EnumTemplateProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumTemplateProfile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let c_value = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == c_value)
            .ok_or_else(|| {
                format!(
                    "Invalid template profile: `{value}`. Expected one of: {:?}",
                    Self::ALL.map(|profile| profile.as_str())
                )
            })
    }
}

/// Fixed metadata cell coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMetaLayout {
    pub coord_company: TypeCellCoord,
    pub coord_manager: TypeCellCoord,
    pub coord_booth_number: TypeCellCoord,
    pub coord_phone: TypeCellCoord,
    pub coord_email: TypeCellCoord,
    pub coord_note: TypeCellCoord,
}

/// Fixed catalog item window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCatalogLayout {
    /// Inclusive first catalog row.
    pub row_start_inclusive: usize,
    /// Exclusive catalog row end.
    pub row_end_exclusive: usize,
    /// Item-name column.
    pub col_name: usize,
    /// Base (provided by default) quantity column.
    pub col_qty_base: usize,
    /// Final/requested quantity column.
    pub col_qty_final: usize,
    /// Optional free-text note column.
    pub col_note: Option<usize>,
    /// Optional explicit unit-price column.
    pub col_price: Option<usize>,
}

/// Freeform addenda window below the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAddendaLayout {
    /// Inclusive first addenda row.
    pub row_start_inclusive: usize,
    /// Exclusive addenda row end.
    pub row_end_exclusive: usize,
    pub col_name: usize,
    pub col_qty: usize,
    pub col_price: usize,
    pub col_note: Option<usize>,
}

/// Which bundle parse paths are enabled for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecBundleRule {
    /// Scan textual quantity cells for bundle keywords.
    pub if_scan_quantity: bool,
    /// Scan parenthesized item names for bundle keywords.
    pub if_scan_name: bool,
}

/// Complete coordinate table of one template profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTemplateLayout {
    pub profile: EnumTemplateProfile,
    /// Preferred sheet; the first sheet is used when it is absent.
    pub sheet_name: String,
    pub meta: SpecMetaLayout,
    pub catalog: SpecCatalogLayout,
    pub addenda: Option<SpecAddendaLayout>,
    pub bundle_rule: SpecBundleRule,
    /// Minimum grid height for a well-formed document.
    pub n_rows_min: usize,
    /// Minimum grid width for a well-formed document.
    pub n_cols_min: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RecordModels

/// Exhibitor identity and contact block of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct SpecBoothMeta {
    pub company: String,
    pub manager: String,
    pub booth_number: String,
    pub phone: String,
    pub email: String,
    pub note: String,
}

/// Sheet region a row was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumRowSection {
    /// Fixed catalog window.
    Catalog,
    /// Freeform addenda window.
    Addenda,
}

impl EnumRowSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Addenda => "addenda",
        }
    }
}

/// One non-empty row sliced out of the item windows, cells untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRawRow {
    pub section: EnumRowSection,
    /// Zero-based sheet row.
    pub row_idx: usize,
    pub cell_name: EnumCellValue,
    pub cell_qty_base: EnumCellValue,
    pub cell_qty_final: EnumCellValue,
    pub cell_note: EnumCellValue,
    /// `EnumCellValue::None` when the window has no price column.
    pub cell_price: EnumCellValue,
}

/// Priced record before aggregation; one per decomposed `(name, quantity)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecExtractedRecord {
    pub item_name: String,
    pub quantity: u64,
    pub unit_price: u64,
    pub line_total: u64,
    pub note: String,
    pub section: EnumRowSection,
    pub row_idx: usize,
    /// Price came from the sheet rather than the static table.
    pub if_price_explicit: bool,
}

/// Aggregated ledger entry, unique by `item_name` within one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecItemRecord {
    pub item_name: String,
    pub quantity: u64,
    pub unit_price: u64,
    pub line_total: u64,
    pub note: String,
}

/// Deduplicated item list of one document in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct SpecLedger {
    pub items: Vec<SpecItemRecord>,
}

impl SpecLedger {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up an entry by canonical item name.
    pub fn get(&self, item_name: &str) -> Option<&SpecItemRecord> {
        self.items.iter().find(|item| item.item_name == item_name)
    }

    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn total_amount(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.line_total))
    }
}

/// Full extraction result of one grid, independent of the document's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecDocumentExtraction {
    pub meta: SpecBoothMeta,
    pub ledger: SpecLedger,
    /// Pre-aggregation records, kept for the detail table.
    pub records: Vec<SpecExtractedRecord>,
}

/// Extraction result tagged with its source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecBoothLedger {
    /// Display name of the source document.
    pub document: String,
    pub meta: SpecBoothMeta,
    pub ledger: SpecLedger,
    pub records: Vec<SpecExtractedRecord>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeOptions

/// Options for [`crate::OrderFormMerger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeOptions {
    /// Template revision of the uploaded documents.
    pub profile: EnumTemplateProfile,
    /// Keep zero-quantity items and item-less documents (BoothMeta-only rows).
    pub if_include_zero_quantity: bool,
    /// Emit the company x item pivot table.
    pub if_build_pivot: bool,
    /// Emit the per-record detail table.
    pub if_build_detail: bool,
    /// Maximum worker threads for the per-document stage.
    pub num_workers_max: Option<usize>,
    /// Separator used when merging distinct notes.
    pub note_separator: String,
}

impl Default for SpecMergeOptions {
    fn default() -> Self {
        Self {
            profile: EnumTemplateProfile::AddendaAware,
            if_include_zero_quantity: false,
            if_build_pivot: true,
            if_build_detail: false,
            num_workers_max: None,
            note_separator: ", ".to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// One skipped document with its user-facing cause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecDocumentWarning {
    /// Display name of the skipped document.
    pub document: String,
    /// User-facing error text.
    pub exception: String,
}

impl fmt::Display for SpecDocumentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.document, self.exception)
    }
}

/// Errors surfaced by the extraction and merge stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFormError {
    /// Grid too small, sheet missing or unreadable.
    MalformedDocument {
        /// Display name of the document.
        document: String,
        /// Underlying cause.
        reason: String,
    },
    /// No documents supplied, or every document failed.
    EmptyBatch {
        /// Warnings of the failed documents (empty when none were supplied).
        warnings: Vec<SpecDocumentWarning>,
    },
}

impl fmt::Display for OrderFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDocument { document, reason } => {
                write!(f, "Malformed document {document}: {reason}")
            }
            Self::EmptyBatch { warnings } if warnings.is_empty() => {
                write!(f, "No documents supplied.")
            }
            Self::EmptyBatch { warnings } => write!(
                f,
                "All {} documents failed: {}",
                warnings.len(),
                warnings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        }
    }
}

impl std::error::Error for OrderFormError {}

impl OrderFormError {
    /// Convert a per-document failure into its warning entry.
    pub fn to_warning(&self) -> Option<SpecDocumentWarning> {
        match self {
            Self::MalformedDocument { document, reason } => Some(SpecDocumentWarning {
                document: document.clone(),
                exception: reason.clone(),
            }),
            Self::EmptyBatch { .. } => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PriceTable

/// Static item-name to unit-price lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecPriceTable {
    dict_prices: BTreeMap<String, u64>,
}

impl SpecPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one price; the name is trimmed.
    pub fn insert(&mut self, item_name: &str, unit_price: u64) {
        self.dict_prices
            .insert(item_name.trim().to_string(), unit_price);
    }

    pub fn get(&self, item_name: &str) -> Option<u64> {
        self.dict_prices.get(item_name.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.dict_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_prices.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for SpecPriceTable {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (item_name, unit_price) in iter {
            table.insert(item_name.as_ref(), unit_price);
        }
        table
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
