//! XLSX writer that persists report tables as workbook sheets.

use std::collections::HashSet;
use std::path::PathBuf;

use boothkit_order::{EnumCellValue, ReportSink, SpecNamedTable};
use polars::prelude::{AnyValue, DataFrame, DataType};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellBorder, EnumHorizontalAlign, EnumVerticalAlign, SpecCellFormat, SpecSheetReport,
    SpecXlsxReport, SpecXlsxWriteOptions,
};
use crate::util::{
    calculate_autofit_width, cast_col_num, cast_row_num, estimate_unicode_string_width,
    sanitize_sheet_name,
};

/// Text columns vs. quantity/amount columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumColumnKind {
    Text,
    Amount,
}

impl EnumColumnKind {
    fn from_dtype(dtype: &DataType) -> Self {
        if dtype.is_integer() || dtype.is_float() {
            Self::Amount
        } else {
            Self::Text
        }
    }
}

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    write_options: SpecXlsxWriteOptions,
    /// Lowercased names already taken; Excel compares sheet names case-insensitively.
    set_sheet_keys_used: HashSet<String>,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and options.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(path_file_out: impl Into<PathBuf>, write_options: SpecXlsxWriteOptions) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            write_options,
            set_sheet_keys_used: HashSet::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    pub fn report(&self) -> &SpecXlsxReport {
        &self.report
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), String> {
        if self.if_closed {
            return Ok(());
        }
        let path_file_out = self.path_file_out.display().to_string();
        self.workbook
            .save(&self.path_file_out)
            .map_err(|err| derive_xlsx_error_text(&path_file_out, err))?;
        self.if_closed = true;
        info!(
            path = %self.path_file_out.display(),
            sheets = self.report.sheets.len(),
            "workbook saved"
        );
        Ok(())
    }

    /// Write one table into a new sheet; returns the name actually used.
    pub fn write_sheet(&mut self, df: &DataFrame, sheet_name: &str) -> Result<String, String> {
        if self.if_closed {
            return Err("Cannot write after close().".to_string());
        }
        let n_height = df.height();
        let n_width = df.width();
        if n_height + 1 > N_NROWS_EXCEL_MAX {
            return Err(format!(
                "Table for sheet {sheet_name:?} has {n_height} rows; Excel allows {}.",
                N_NROWS_EXCEL_MAX - 1
            ));
        }
        if n_width > N_NCOLS_EXCEL_MAX {
            return Err(format!(
                "Table for sheet {sheet_name:?} has {n_width} columns; Excel allows {N_NCOLS_EXCEL_MAX}."
            ));
        }

        let c_sheet_sanitized = sanitize_sheet_name(sheet_name, "_");
        if c_sheet_sanitized != sheet_name {
            self.report
                .warn(format!("Sheet name {sheet_name:?} sanitized to {c_sheet_sanitized:?}."));
        }
        let c_sheet_unique =
            derive_unique_sheet_name(&mut self.set_sheet_keys_used, &c_sheet_sanitized);
        let map_err = |err: XlsxError| derive_xlsx_error_text(&c_sheet_unique, err);

        let cfg_formats = &self.write_options.formats;
        let fmt_header = derive_rust_xlsx_format(&cfg_formats.header);
        let l_cols = df.get_columns();
        let l_kinds: Vec<EnumColumnKind> = l_cols
            .iter()
            .map(|col| EnumColumnKind::from_dtype(col.dtype()))
            .collect();
        let l_fmt_by_col: Vec<Format> = l_kinds
            .iter()
            .map(|kind| {
                derive_rust_xlsx_format(match kind {
                    EnumColumnKind::Text => &cfg_formats.text,
                    EnumColumnKind::Amount => &cfg_formats.amount,
                })
            })
            .collect();

        let policy_autofit = &self.write_options.policy_autofit;
        let n_rows_autofit = policy_autofit
            .height_body_inferred_max
            .map_or(n_height, |n_max| usize::min(n_max, n_height));
        let mut l_width_by_col: Vec<usize> = df
            .get_column_names_str()
            .iter()
            .map(|c_name| estimate_unicode_string_width(c_name))
            .collect();

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&c_sheet_unique).map_err(map_err)?;

        for (n_idx_col, c_name) in df.get_column_names_str().iter().enumerate() {
            worksheet
                .write_string_with_format(0, cast_col_num(n_idx_col)?, *c_name, &fmt_header)
                .map_err(map_err)?;
        }

        for (n_idx_col, col) in l_cols.iter().enumerate() {
            for n_idx_row in 0..n_height {
                let value = derive_cell_value_from_any_value(
                    col.get(n_idx_row)
                        .map_err(|err| format!("Failed to access cell value: {err}"))?,
                );
                if policy_autofit.if_autofit && n_idx_row < n_rows_autofit {
                    l_width_by_col[n_idx_col] = usize::max(
                        l_width_by_col[n_idx_col],
                        estimate_width_len(&value, l_kinds[n_idx_col]),
                    );
                }
                write_cell_with_format(
                    worksheet,
                    (n_idx_row + 1, n_idx_col),
                    &value,
                    &l_fmt_by_col[n_idx_col],
                )
                .map_err(|err| {
                    format!(
                        "Failed to write cell ({}, {n_idx_col}) of sheet {c_sheet_unique:?}: {err}",
                        n_idx_row + 1
                    )
                })?;
            }
        }

        if self.write_options.if_freeze_header {
            worksheet.set_freeze_panes(1, 0).map_err(map_err)?;
        }
        if policy_autofit.if_autofit {
            for (n_idx_col, n_width) in l_width_by_col.iter().enumerate() {
                worksheet
                    .set_column_width(
                        cast_col_num(n_idx_col)?,
                        calculate_autofit_width(*n_width, policy_autofit) as f64,
                    )
                    .map_err(map_err)?;
            }
        }

        debug!(sheet = %c_sheet_unique, rows = n_height, cols = n_width, "sheet written");
        self.report.sheets.push(SpecSheetReport {
            sheet_name: c_sheet_unique.clone(),
            n_rows: n_height,
            n_cols: n_width,
        });
        Ok(c_sheet_unique)
    }
}

impl ReportSink for XlsxWriter {
    fn write(&mut self, tables: &[SpecNamedTable]) -> Result<(), String> {
        for table in tables {
            self.write_sheet(&table.df, &table.sheet_name)?;
        }
        Ok(())
    }
}

fn estimate_width_len(value: &EnumCellValue, kind: EnumColumnKind) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => match kind {
            // Rendered through `#,##0`.
            EnumColumnKind::Amount => {
                let n_digits = format!("{:.0}", n.abs()).len();
                n_digits + (n_digits.saturating_sub(1)) / 3 + usize::from(*n < 0.0)
            }
            EnumColumnKind::Text => n.to_string().len(),
        },
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "TRUE" } else { "FALSE" }.to_string())
        }
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

/// Reserve a sheet name not yet used in the workbook, ignoring case.
///
/// Clashing names get a `__N` suffix; the base is shortened so the result
/// stays within Excel's sheet-name length.
fn derive_unique_sheet_name(set_sheet_keys_used: &mut HashSet<String>, name: &str) -> String {
    if set_sheet_keys_used.insert(name.to_lowercase()) {
        return name.to_string();
    }
    (2usize..)
        .map(|n_idx| {
            let c_suffix = format!("__{n_idx}");
            let n_len_base = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());
            let c_base: String = name.chars().take(usize::max(1, n_len_base)).collect();
            format!("{c_base}{c_suffix}")
        })
        .find(|candidate| set_sheet_keys_used.insert(candidate.to_lowercase()))
        .unwrap_or_else(|| name.to_string())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    coord: (usize, usize),
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    let (n_row, n_col) = (cast_row_num(coord.0)?, cast_col_num(coord.1)?);
    let result = match value {
        EnumCellValue::None => worksheet.write_blank(n_row, n_col, format),
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)
        }
    };
    result.map(|_| ()).map_err(|err| err.to_string())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();
    if let Some(font_name) = &spec.font_name {
        format = format.set_font_name(font_name.as_str());
    }
    if let Some(font_size) = spec.font_size {
        format = format.set_font_size(f64::from(font_size));
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if let Some(align) = spec.align {
        format = format.set_align(match align {
            EnumHorizontalAlign::Left => FormatAlign::Left,
            EnumHorizontalAlign::Center => FormatAlign::Center,
            EnumHorizontalAlign::Right => FormatAlign::Right,
        });
    }
    if let Some(valign) = spec.valign {
        format = format.set_align(match valign {
            EnumVerticalAlign::Top => FormatAlign::Top,
            EnumVerticalAlign::Center => FormatAlign::VerticalCenter,
            EnumVerticalAlign::Bottom => FormatAlign::Bottom,
        });
    }
    if let Some(border) = spec.border {
        format = format.set_border(match border {
            EnumCellBorder::Thin => FormatBorder::Thin,
            EnumCellBorder::Medium => FormatBorder::Medium,
        });
    }
    if let Some(num_format) = &spec.num_format {
        format = format.set_num_format(num_format.as_str());
    }
    if let Some(bg_color) = &spec.bg_color {
        format = format.set_background_color(bg_color.as_str());
    }
    format
}

fn derive_xlsx_error_text(target: &str, err: XlsxError) -> String {
    format!("Failed to write {target:?}: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_sheet_names_get_suffix() {
        let mut set_keys = HashSet::new();
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "Merged"), "Merged");
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "Merged"), "Merged__2");
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "Merged"), "Merged__3");

        let c_long = "x".repeat(31);
        derive_unique_sheet_name(&mut set_keys, &c_long);
        let c_second = derive_unique_sheet_name(&mut set_keys, &c_long);
        assert_eq!(c_second.chars().count(), 31);
        assert!(c_second.ends_with("__2"));
    }

    #[test]
    fn test_unique_sheet_names_ignore_case() {
        let mut set_keys = HashSet::new();
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "Pivot"), "Pivot");
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "PIVOT"), "PIVOT__2");
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "pivot__2"), "pivot__2__2");
        assert_eq!(derive_unique_sheet_name(&mut set_keys, "pivot"), "pivot__3");
    }

    #[test]
    fn test_sheets_differing_only_in_case_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            XlsxWriter::new(dir.path().join("out.xlsx"), SpecXlsxWriteOptions::default());
        let df = DataFrame::empty();
        assert_eq!(writer.write_sheet(&df, "Detail").unwrap(), "Detail");
        assert_eq!(writer.write_sheet(&df, "detail").unwrap(), "detail__2");
        writer.close().unwrap();
        assert_eq!(writer.report().sheets.len(), 2);
    }

    #[test]
    fn test_width_estimate_counts_thousands_separators() {
        let value = EnumCellValue::Number(1_200_000.0);
        assert_eq!(estimate_width_len(&value, EnumColumnKind::Amount), 9);
        assert_eq!(estimate_width_len(&value, EnumColumnKind::Text), 7);
        assert_eq!(estimate_width_len(&EnumCellValue::None, EnumColumnKind::Text), 0);
    }

    #[test]
    fn test_column_kind_from_dtype() {
        assert_eq!(EnumColumnKind::from_dtype(&DataType::UInt64), EnumColumnKind::Amount);
        assert_eq!(EnumColumnKind::from_dtype(&DataType::Float64), EnumColumnKind::Amount);
        assert_eq!(EnumColumnKind::from_dtype(&DataType::String), EnumColumnKind::Text);
    }
}
