//! Spreadsheet source interface and the in-memory implementation.

use std::fmt;

use crate::cell::SpecGrid;

/// Read-only access to the sheets of one uploaded workbook.
///
/// Implementations must be shareable across the per-document worker pool.
pub trait SpreadsheetSource: Send + Sync {
    /// Sheet names in workbook order.
    fn list_sheets(&self) -> Result<Vec<String>, String>;

    /// Materialize one sheet as a zero-indexed grid.
    fn read_grid(&self, sheet_name: &str) -> Result<SpecGrid, String>;
}

/// Workbook whose sheets are already materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecMemorySource {
    l_sheets: Vec<(String, SpecGrid)>,
}

impl SpecMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet; a duplicate name replaces the earlier grid in place.
    pub fn with_sheet(mut self, sheet_name: &str, grid: SpecGrid) -> Self {
        self.push_sheet(sheet_name, grid);
        self
    }

    pub fn push_sheet(&mut self, sheet_name: &str, grid: SpecGrid) {
        if let Some(entry) = self
            .l_sheets
            .iter_mut()
            .find(|(c_name, _)| c_name == sheet_name)
        {
            entry.1 = grid;
            return;
        }
        self.l_sheets.push((sheet_name.to_string(), grid));
    }
}

impl SpreadsheetSource for SpecMemorySource {
    fn list_sheets(&self) -> Result<Vec<String>, String> {
        Ok(self.l_sheets.iter().map(|(c_name, _)| c_name.clone()).collect())
    }

    fn read_grid(&self, sheet_name: &str) -> Result<SpecGrid, String> {
        self.l_sheets
            .iter()
            .find(|(c_name, _)| c_name == sheet_name)
            .map(|(_, grid)| grid.clone())
            .ok_or_else(|| format!("Sheet not found: {sheet_name:?}"))
    }
}

/// One uploaded document: display name plus its workbook.
pub struct SpecSourceDocument {
    /// Name shown in warnings and the `source` column.
    pub name: String,
    pub source: Box<dyn SpreadsheetSource>,
}

impl SpecSourceDocument {
    pub fn new(name: impl Into<String>, source: impl SpreadsheetSource + 'static) -> Self {
        Self {
            name: name.into(),
            source: Box::new(source),
        }
    }
}

impl fmt::Debug for SpecSourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecSourceDocument")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Pick `sheet_preferred` when present, else the first sheet.
pub fn select_sheet_name(
    source: &dyn SpreadsheetSource,
    sheet_preferred: &str,
) -> Result<String, String> {
    let l_sheet_names = source.list_sheets()?;
    if l_sheet_names.iter().any(|c_name| c_name == sheet_preferred) {
        return Ok(sheet_preferred.to_string());
    }
    l_sheet_names.into_iter().next().ok_or_else(|| {
        format!("Workbook has no sheets (expected {sheet_preferred:?} or a fallback sheet).")
    })
}
