//! `boothkit_io_xlsx` v1:
//! Workbook adapters for the order-form engine.
//!
//! - `conf`   : Excel limits and default format presets
//! - `spec`   : formats/options/reports
//! - `util`   : pure helper functions
//! - `reader` : calamine-backed workbook loading
//! - `writer` : rust_xlsxwriter-backed report sink
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
    derive_default_xlsx_formats, derive_default_xlsx_write_options,
};
pub use reader::{
    derive_grid_from_range, load_document_from_bytes, load_document_from_path,
    load_documents_from_bytes, load_documents_from_paths, read_workbook_from_bytes,
    read_workbook_from_path,
};
pub use spec::{
    EnumCellBorder, EnumHorizontalAlign, EnumVerticalAlign, SpecAutofitCellsPolicy,
    SpecCellFormat, SpecSheetReport, SpecXlsxFormats, SpecXlsxReport, SpecXlsxWriteOptions,
};
pub use util::{convert_data_to_cell_value, sanitize_sheet_name};
pub use writer::XlsxWriter;
