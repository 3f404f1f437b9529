//! Workbook loading into in-memory spreadsheet sources.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use boothkit_order::{
    EnumCellValue, SpecGrid, SpecMemorySource, SpecSourceDocument, SpreadsheetSource,
};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use tracing::debug;

use crate::util::convert_data_to_cell_value;

/// Materialize one calamine range at its absolute sheet position.
pub fn derive_grid_from_range(range: &Range<Data>) -> SpecGrid {
    let Some((n_row_start, n_col_start)) = range.start() else {
        return SpecGrid::default();
    };
    let (n_row_start, n_col_start) = (n_row_start as usize, n_col_start as usize);

    let mut l_rows: Vec<Vec<EnumCellValue>> = vec![Vec::new(); n_row_start];
    for row in range.rows() {
        let mut l_cells = vec![EnumCellValue::None; n_col_start];
        l_cells.extend(row.iter().map(convert_data_to_cell_value));
        l_rows.push(l_cells);
    }
    SpecGrid::new(l_rows)
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<SpecMemorySource, String> {
    let mut source = SpecMemorySource::new();
    for c_sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&c_sheet_name)
            .map_err(|err| format!("Failed to read sheet {c_sheet_name:?}: {err}"))?;
        let grid = derive_grid_from_range(&range);
        debug!(
            sheet = %c_sheet_name,
            rows = grid.height(),
            cols = grid.width(),
            "sheet loaded"
        );
        source.push_sheet(&c_sheet_name, grid);
    }
    Ok(source)
}

/// Load every sheet of the workbook at `path` (xlsx, xlsm, xls, ods).
pub fn read_workbook_from_path(path: impl AsRef<Path>) -> Result<SpecMemorySource, String> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| format!("Failed to open workbook {}: {err}", path.display()))?;
    read_sheets(&mut workbook)
}

/// Load every sheet of an uploaded workbook held in memory.
pub fn read_workbook_from_bytes(v_bytes: &[u8]) -> Result<SpecMemorySource, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(v_bytes))
        .map_err(|err| format!("Failed to open workbook bytes: {err}"))?;
    read_sheets(&mut workbook)
}

/// Named document backed by the workbook at `path`, named by its file name.
pub fn load_document_from_path(path: impl AsRef<Path>) -> Result<SpecSourceDocument, String> {
    let path = path.as_ref();
    let c_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SpecSourceDocument::new(c_name, read_workbook_from_path(path)?))
}

/// Named document backed by uploaded bytes.
pub fn load_document_from_bytes(
    name: impl Into<String>,
    v_bytes: &[u8],
) -> Result<SpecSourceDocument, String> {
    Ok(SpecSourceDocument::new(name, read_workbook_from_bytes(v_bytes)?))
}

/// Workbook that could not be opened; every read reports the open error.
#[derive(Debug, Clone)]
struct SpecUnreadableSource {
    reason: String,
}

impl SpreadsheetSource for SpecUnreadableSource {
    fn list_sheets(&self) -> Result<Vec<String>, String> {
        Err(self.reason.clone())
    }

    fn read_grid(&self, _sheet_name: &str) -> Result<SpecGrid, String> {
        Err(self.reason.clone())
    }
}

/// Load a batch of uploads without aborting on unreadable workbooks.
///
/// A workbook that fails to open still yields a document, whose reads fail
/// with the open error so the merger reports it as a warning.
pub fn load_documents_from_bytes<S: AsRef<str>>(
    l_uploads: &[(S, Vec<u8>)],
) -> Vec<SpecSourceDocument> {
    l_uploads
        .iter()
        .map(|(name, v_bytes)| {
            let c_name = name.as_ref();
            match read_workbook_from_bytes(v_bytes) {
                Ok(source) => SpecSourceDocument::new(c_name, source),
                Err(reason) => {
                    debug!(document = %c_name, "unreadable workbook: {reason}");
                    SpecSourceDocument::new(c_name, SpecUnreadableSource { reason })
                }
            }
        })
        .collect()
}

/// Path counterpart of [`load_documents_from_bytes`].
pub fn load_documents_from_paths<P: AsRef<Path>>(l_paths: &[P]) -> Vec<SpecSourceDocument> {
    l_paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            load_document_from_path(path).unwrap_or_else(|reason| {
                debug!(path = %path.display(), "unreadable workbook: {reason}");
                SpecSourceDocument::new(path.display().to_string(), SpecUnreadableSource { reason })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_range_honours_start_offset() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("의자".to_string()));
        range.set_value((3, 2), Data::Float(4.0));

        let grid = derive_grid_from_range(&range);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.cell(2, 1), &EnumCellValue::String("의자".to_string()));
        assert_eq!(grid.cell(3, 2), &EnumCellValue::Number(4.0));
        assert_eq!(grid.cell(0, 0), &EnumCellValue::None);
    }

    #[test]
    fn test_empty_range_gives_empty_grid() {
        let range: Range<Data> = Range::empty();
        assert_eq!(derive_grid_from_range(&range).height(), 0);
    }

    #[test]
    fn test_garbage_bytes_fail_to_open() {
        assert!(read_workbook_from_bytes(b"not a workbook").is_err());
        let l_documents = load_documents_from_bytes(&[("junk.xlsx", b"junk".to_vec())]);
        assert_eq!(l_documents.len(), 1);
        assert_eq!(l_documents[0].name, "junk.xlsx");
        let err = l_documents[0].source.list_sheets().unwrap_err();
        assert!(err.starts_with("Failed to open workbook bytes"));
    }
}
