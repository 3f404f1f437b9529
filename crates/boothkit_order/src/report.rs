//! Merged report model, pivot view and output tables.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::conf::{C_PIVOT_LABEL_COLUMN, C_SHEET_DETAIL, C_SHEET_LEDGER, C_SHEET_PIVOT};
use crate::spec::{SpecBoothLedger, SpecDocumentWarning, SpecMergeOptions};

/// Merge result of one batch: ledgers in upload order plus per-document
/// diagnostics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergedReport {
    /// Successful documents in upload order.
    pub documents: Vec<SpecBoothLedger>,
    /// Documents excluded because they failed.
    pub warnings: Vec<SpecDocumentWarning>,
    /// Documents dropped because no non-zero item remained.
    pub documents_empty: Vec<String>,
}

/// Company x item quantity matrix, absent combinations filled with 0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpecPivot {
    /// Row labels in first-seen order.
    pub companies: Vec<String>,
    /// Column labels in first-seen order.
    pub items: Vec<String>,
    /// `quantities[row][col]`.
    pub quantities: Vec<Vec<u64>>,
}

impl SpecPivot {
    pub fn get(&self, company: &str, item_name: &str) -> Option<u64> {
        let n_row = self.companies.iter().position(|c| c == company)?;
        let n_col = self.items.iter().position(|c| c == item_name)?;
        Some(self.quantities[n_row][n_col])
    }
}

/// One output table and the sheet it should land on.
#[derive(Debug, Clone)]
pub struct SpecNamedTable {
    pub sheet_name: String,
    pub df: DataFrame,
}

/// Destination of the merged tables (workbook writer, test recorder, ...).
pub trait ReportSink {
    fn write(&mut self, tables: &[SpecNamedTable]) -> Result<(), String>;
}

impl MergedReport {
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Number of aggregated ledger entries over all documents.
    pub fn record_count(&self) -> usize {
        self.documents.iter().map(|doc| doc.ledger.len()).sum()
    }

    pub fn total_quantity(&self) -> u64 {
        self.documents
            .iter()
            .fold(0u64, |acc, doc| acc.saturating_add(doc.ledger.total_quantity()))
    }

    pub fn total_amount(&self) -> u64 {
        self.documents
            .iter()
            .fold(0u64, |acc, doc| acc.saturating_add(doc.ledger.total_amount()))
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_documents".to_string(), self.document_count() as u64);
        dict_counts.insert("cnt_records".to_string(), self.record_count() as u64);
        dict_counts.insert("sum_quantity".to_string(), self.total_quantity());
        dict_counts.insert("sum_amount".to_string(), self.total_amount());
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts.insert("cnt_empty".to_string(), self.documents_empty.len() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} documents={} records={} quantity={} total={} warnings={} empty={}",
            dict_counts["cnt_documents"],
            dict_counts["cnt_records"],
            dict_counts["sum_quantity"],
            dict_counts["sum_amount"],
            dict_counts["cnt_warnings"],
            dict_counts["cnt_empty"]
        )
    }

    /// Reshape quantities into a company x item matrix.
    ///
    /// Documents sharing a company name are summed into one row.
    pub fn derive_pivot(&self) -> SpecPivot {
        let mut dict_rows: IndexMap<&str, IndexMap<&str, u64>> = IndexMap::new();
        let mut l_items: Vec<String> = Vec::new();

        for doc in &self.documents {
            let dict_row = dict_rows.entry(doc.meta.company.as_str()).or_default();
            for item in &doc.ledger.items {
                let n_qty = dict_row.entry(item.item_name.as_str()).or_default();
                *n_qty = n_qty.saturating_add(item.quantity);
                if !l_items.iter().any(|c| *c == item.item_name) {
                    l_items.push(item.item_name.clone());
                }
            }
        }

        let quantities = dict_rows
            .values()
            .map(|dict_row| {
                l_items
                    .iter()
                    .map(|c_item| dict_row.get(c_item.as_str()).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        SpecPivot {
            companies: dict_rows.keys().map(|c| c.to_string()).collect(),
            items: l_items,
            quantities,
        }
    }

    /// Consolidated ledger: one row per (document, item).
    ///
    /// Documents kept with an empty ledger contribute one row with null item
    /// columns.
    pub fn build_ledger_table(&self) -> Result<DataFrame, String> {
        let mut l_source = Vec::new();
        let mut l_company = Vec::new();
        let mut l_manager = Vec::new();
        let mut l_booth = Vec::new();
        let mut l_phone = Vec::new();
        let mut l_email = Vec::new();
        let mut l_booth_note = Vec::new();
        let mut l_item: Vec<Option<String>> = Vec::new();
        let mut l_qty: Vec<Option<u64>> = Vec::new();
        let mut l_price: Vec<Option<u64>> = Vec::new();
        let mut l_total: Vec<Option<u64>> = Vec::new();
        let mut l_item_note: Vec<Option<String>> = Vec::new();

        for doc in &self.documents {
            let n_rows = usize::max(1, doc.ledger.len());
            for _ in 0..n_rows {
                l_source.push(doc.document.clone());
                l_company.push(doc.meta.company.clone());
                l_manager.push(doc.meta.manager.clone());
                l_booth.push(doc.meta.booth_number.clone());
                l_phone.push(doc.meta.phone.clone());
                l_email.push(doc.meta.email.clone());
                l_booth_note.push(doc.meta.note.clone());
            }
            if doc.ledger.is_empty() {
                l_item.push(None);
                l_qty.push(None);
                l_price.push(None);
                l_total.push(None);
                l_item_note.push(None);
                continue;
            }
            for item in &doc.ledger.items {
                l_item.push(Some(item.item_name.clone()));
                l_qty.push(Some(item.quantity));
                l_price.push(Some(item.unit_price));
                l_total.push(Some(item.line_total));
                l_item_note.push(Some(item.note.clone()));
            }
        }

        DataFrame::new(vec![
            Column::new("source".into(), l_source),
            Column::new("company".into(), l_company),
            Column::new("manager".into(), l_manager),
            Column::new("booth_number".into(), l_booth),
            Column::new("phone".into(), l_phone),
            Column::new("email".into(), l_email),
            Column::new("booth_note".into(), l_booth_note),
            Column::new("item_name".into(), l_item),
            Column::new("quantity".into(), l_qty),
            Column::new("unit_price".into(), l_price),
            Column::new("line_total".into(), l_total),
            Column::new("item_note".into(), l_item_note),
        ])
        .map_err(|err| format!("Failed to build ledger table: {err}"))
    }

    /// Pivot view as a table: `company` column, then one column per item.
    ///
    /// An item whose name is already taken by an earlier column gets a
    /// `__N` suffix.
    pub fn build_pivot_table(&self) -> Result<DataFrame, String> {
        let pivot = self.derive_pivot();
        let mut set_names_used: HashSet<String> = HashSet::new();
        let mut l_cols = Vec::with_capacity(pivot.items.len() + 1);
        l_cols.push(Column::new(
            derive_unique_column_name(&mut set_names_used, C_PIVOT_LABEL_COLUMN).into(),
            pivot.companies.clone(),
        ));
        for (n_col, c_item) in pivot.items.iter().enumerate() {
            let l_values: Vec<u64> = pivot.quantities.iter().map(|row| row[n_col]).collect();
            let c_column = derive_unique_column_name(&mut set_names_used, c_item);
            l_cols.push(Column::new(c_column.into(), l_values));
        }
        DataFrame::new(l_cols).map_err(|err| format!("Failed to build pivot table: {err}"))
    }

    /// Pre-aggregation records with their sheet origin.
    pub fn build_detail_table(&self) -> Result<DataFrame, String> {
        let n_rows: usize = self.documents.iter().map(|doc| doc.records.len()).sum();
        let mut l_source = Vec::with_capacity(n_rows);
        let mut l_company = Vec::with_capacity(n_rows);
        let mut l_section = Vec::with_capacity(n_rows);
        let mut l_row: Vec<u64> = Vec::with_capacity(n_rows);
        let mut l_item = Vec::with_capacity(n_rows);
        let mut l_qty: Vec<u64> = Vec::with_capacity(n_rows);
        let mut l_price: Vec<u64> = Vec::with_capacity(n_rows);
        let mut l_total: Vec<u64> = Vec::with_capacity(n_rows);
        let mut l_note = Vec::with_capacity(n_rows);

        for doc in &self.documents {
            for record in &doc.records {
                l_source.push(doc.document.clone());
                l_company.push(doc.meta.company.clone());
                l_section.push(record.section.as_str().to_string());
                l_row.push(record.row_idx as u64 + 1);
                l_item.push(record.item_name.clone());
                l_qty.push(record.quantity);
                l_price.push(record.unit_price);
                l_total.push(record.line_total);
                l_note.push(record.note.clone());
            }
        }

        DataFrame::new(vec![
            Column::new("source".into(), l_source),
            Column::new("company".into(), l_company),
            Column::new("section".into(), l_section),
            Column::new("row".into(), l_row),
            Column::new("item_name".into(), l_item),
            Column::new("quantity".into(), l_qty),
            Column::new("unit_price".into(), l_price),
            Column::new("line_total".into(), l_total),
            Column::new("note".into(), l_note),
        ])
        .map_err(|err| format!("Failed to build detail table: {err}"))
    }

    /// Tables selected by `options`, ledger first.
    pub fn derive_named_tables(
        &self,
        options: &SpecMergeOptions,
    ) -> Result<Vec<SpecNamedTable>, String> {
        let mut l_tables = vec![SpecNamedTable {
            sheet_name: C_SHEET_LEDGER.to_string(),
            df: self.build_ledger_table()?,
        }];
        if options.if_build_pivot {
            l_tables.push(SpecNamedTable {
                sheet_name: C_SHEET_PIVOT.to_string(),
                df: self.build_pivot_table()?,
            });
        }
        if options.if_build_detail {
            l_tables.push(SpecNamedTable {
                sheet_name: C_SHEET_DETAIL.to_string(),
                df: self.build_detail_table()?,
            });
        }
        Ok(l_tables)
    }

    /// Build the selected tables and hand them to `sink`.
    pub fn export(
        &self,
        options: &SpecMergeOptions,
        sink: &mut dyn ReportSink,
    ) -> Result<(), String> {
        let l_tables = self.derive_named_tables(options)?;
        debug!(tables = l_tables.len(), "writing report tables");
        sink.write(&l_tables)
    }
}

fn derive_unique_column_name(set_names_used: &mut HashSet<String>, name: &str) -> String {
    let mut c_candidate = name.to_string();
    let mut n_idx = 2usize;
    while set_names_used.contains(&c_candidate) {
        c_candidate = format!("{name}__{n_idx}");
        n_idx += 1;
    }
    set_names_used.insert(c_candidate.clone());
    c_candidate
}

impl fmt::Display for MergedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MERGE]"))
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::AnyValue;

    use super::*;
    use crate::spec::{
        EnumRowSection, SpecBoothMeta, SpecExtractedRecord, SpecItemRecord, SpecLedger,
    };

    fn item(name: &str, quantity: u64, unit_price: u64) -> SpecItemRecord {
        SpecItemRecord {
            item_name: name.to_string(),
            quantity,
            unit_price,
            line_total: quantity * unit_price,
            note: String::new(),
        }
    }

    fn booth(document: &str, company: &str, items: Vec<SpecItemRecord>) -> SpecBoothLedger {
        let records = items
            .iter()
            .enumerate()
            .map(|(n_idx, it)| SpecExtractedRecord {
                item_name: it.item_name.clone(),
                quantity: it.quantity,
                unit_price: it.unit_price,
                line_total: it.line_total,
                note: it.note.clone(),
                section: EnumRowSection::Catalog,
                row_idx: 8 + n_idx,
                if_price_explicit: false,
            })
            .collect();
        SpecBoothLedger {
            document: document.to_string(),
            meta: SpecBoothMeta {
                company: company.to_string(),
                ..Default::default()
            },
            ledger: SpecLedger { items },
            records,
        }
    }

    fn report() -> MergedReport {
        MergedReport {
            documents: vec![
                booth("a.xlsx", "Acme", vec![item("의자", 2, 5_000), item("Cabinet", 1, 40_000)]),
                booth("b.xlsx", "Beta", vec![item("멀티탭", 3, 5_000)]),
                booth("c.xlsx", "Acme", vec![item("의자", 4, 5_000)]),
            ],
            warnings: vec![SpecDocumentWarning {
                document: "x.xlsx".to_string(),
                exception: "boom".to_string(),
            }],
            documents_empty: vec![],
        }
    }

    fn cell_u64(df: &DataFrame, column: &str, row: usize) -> Option<u64> {
        match df.column(column).ok()?.get(row).ok()? {
            AnyValue::UInt64(n) => Some(n),
            _ => None,
        }
    }

    fn cell_str(df: &DataFrame, column: &str, row: usize) -> Option<String> {
        match df.column(column).ok()?.get(row).ok()? {
            AnyValue::String(s) => Some(s.to_string()),
            AnyValue::StringOwned(s) => Some(s.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_format_and_to_dict() {
        let report = report();
        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_documents"], 3);
        assert_eq!(dict_counts["cnt_records"], 4);
        assert_eq!(dict_counts["sum_quantity"], 10);
        assert_eq!(dict_counts["sum_amount"], 85_000);
        assert_eq!(
            report.to_string(),
            "[MERGE] documents=3 records=4 quantity=10 total=85000 warnings=1 empty=0"
        );
    }

    #[test]
    fn test_pivot_sums_company_rows_and_fills_zero() {
        let pivot = report().derive_pivot();
        assert_eq!(pivot.companies, vec!["Acme", "Beta"]);
        assert_eq!(pivot.items, vec!["의자", "Cabinet", "멀티탭"]);
        assert_eq!(pivot.get("Acme", "의자"), Some(6));
        assert_eq!(pivot.get("Beta", "의자"), Some(0));
        assert_eq!(pivot.get("Beta", "멀티탭"), Some(3));
        assert_eq!(pivot.get("Gamma", "의자"), None);
    }

    #[test]
    fn test_ledger_table_rows_follow_upload_order() {
        let df = report().build_ledger_table().unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 12);
        assert_eq!(cell_str(&df, "source", 0).as_deref(), Some("a.xlsx"));
        assert_eq!(cell_str(&df, "item_name", 1).as_deref(), Some("Cabinet"));
        assert_eq!(cell_str(&df, "source", 3).as_deref(), Some("c.xlsx"));
        assert_eq!(cell_u64(&df, "line_total", 3), Some(20_000));
    }

    #[test]
    fn test_ledger_table_keeps_meta_only_row() {
        let report = MergedReport {
            documents: vec![booth("e.xlsx", "Empty", vec![])],
            ..Default::default()
        };
        let df = report.build_ledger_table().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(cell_str(&df, "company", 0).as_deref(), Some("Empty"));
        assert_eq!(cell_u64(&df, "quantity", 0), None);
    }

    #[test]
    fn test_pivot_and_detail_tables() {
        let report = report();
        let df_pivot = report.build_pivot_table().unwrap();
        assert_eq!(df_pivot.height(), 2);
        assert_eq!(cell_u64(&df_pivot, "의자", 0), Some(6));

        let df_detail = report.build_detail_table().unwrap();
        assert_eq!(df_detail.height(), 4);
        assert_eq!(cell_str(&df_detail, "section", 0).as_deref(), Some("catalog"));
        assert_eq!(cell_u64(&df_detail, "row", 1), Some(10));
    }

    #[test]
    fn test_pivot_item_named_like_label_column_is_suffixed() {
        let report = MergedReport {
            documents: vec![booth(
                "a.xlsx",
                "Acme",
                vec![item("company", 2, 0), item("company__2", 1, 0), item("의자", 1, 5_000)],
            )],
            ..Default::default()
        };
        let df_pivot = report.build_pivot_table().unwrap();
        assert_eq!(
            df_pivot.get_column_names_str(),
            vec!["company", "company__2", "company__2__2", "의자"]
        );
        assert_eq!(cell_str(&df_pivot, "company", 0).as_deref(), Some("Acme"));
        assert_eq!(cell_u64(&df_pivot, "company__2", 0), Some(2));
        assert_eq!(cell_u64(&df_pivot, "company__2__2", 0), Some(1));

        let mut l_widths = vec![];
        struct SpecRecorder<'a>(&'a mut Vec<usize>);
        impl ReportSink for SpecRecorder<'_> {
            fn write(&mut self, tables: &[SpecNamedTable]) -> Result<(), String> {
                self.0.extend(tables.iter().map(|t| t.df.width()));
                Ok(())
            }
        }
        report
            .export(&SpecMergeOptions::default(), &mut SpecRecorder(&mut l_widths))
            .unwrap();
        assert_eq!(l_widths, vec![12, 4]);
    }

    #[test]
    fn test_named_tables_follow_options() {
        let report = report();
        let l_names = |options: SpecMergeOptions| -> Vec<String> {
            report
                .derive_named_tables(&options)
                .unwrap()
                .into_iter()
                .map(|table| table.sheet_name)
                .collect()
        };
        assert_eq!(l_names(SpecMergeOptions::default()), vec!["Merged", "Pivot"]);
        assert_eq!(
            l_names(SpecMergeOptions {
                if_build_pivot: false,
                if_build_detail: true,
                ..Default::default()
            }),
            vec!["Merged", "Detail"]
        );
    }

    #[test]
    fn test_export_hands_tables_to_sink() {
        struct SpecRecorder(Vec<String>);
        impl ReportSink for SpecRecorder {
            fn write(&mut self, tables: &[SpecNamedTable]) -> Result<(), String> {
                self.0.extend(tables.iter().map(|t| t.sheet_name.clone()));
                Ok(())
            }
        }

        let mut sink = SpecRecorder(vec![]);
        report().export(&SpecMergeOptions::default(), &mut sink).unwrap();
        assert_eq!(sink.0, vec!["Merged", "Pivot"]);
    }
}
