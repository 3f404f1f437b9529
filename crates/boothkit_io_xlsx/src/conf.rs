//! XLSX constants and default preset factories.

use crate::spec::{
    EnumCellBorder, EnumHorizontalAlign, EnumVerticalAlign, SpecCellFormat, SpecXlsxFormats,
    SpecXlsxWriteOptions,
};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Build the default format presets used by [`crate::writer::XlsxWriter`].
///
/// Korean text renders with Malgun Gothic; quantity and money columns get a
/// thousands separator.
pub fn derive_default_xlsx_formats() -> SpecXlsxFormats {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Malgun Gothic".to_string()),
        font_size: Some(10),
        border: Some(EnumCellBorder::Thin),
        valign: Some(EnumVerticalAlign::Center),
        ..Default::default()
    };

    SpecXlsxFormats {
        text: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some(EnumHorizontalAlign::Left),
            ..Default::default()
        }),
        amount: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some(EnumHorizontalAlign::Right),
            num_format: Some("#,##0".to_string()),
            ..Default::default()
        }),
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some(EnumHorizontalAlign::Center),
            bg_color: Some("#D9E1F2".to_string()),
            ..Default::default()
        }),
    }
}

/// Build default write options.
pub fn derive_default_xlsx_write_options() -> SpecXlsxWriteOptions {
    SpecXlsxWriteOptions::default()
}
