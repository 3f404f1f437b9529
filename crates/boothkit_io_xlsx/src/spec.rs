//! XLSX adapter format, policy and report models.

////////////////////////////////////////////////////////////////////////////////
// #region CellFormat

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumHorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumVerticalAlign {
    Top,
    Center,
    Bottom,
}

/// Outline drawn on all four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCellBorder {
    Thin,
    Medium,
}

/// Cell format; unset fields fall back to the workbook default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<u16>,
    pub bold: Option<bool>,

    pub align: Option<EnumHorizontalAlign>,
    pub valign: Option<EnumVerticalAlign>,
    pub border: Option<EnumCellBorder>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color as `#RRGGBB`.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.or(self.align),
            valign: other.valign.or(self.valign),
            border: other.border.or(self.border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

/// Format presets per column kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormats {
    pub text: SpecCellFormat,
    /// Numeric columns: quantities and KRW amounts.
    pub amount: SpecCellFormat,
    pub header: SpecCellFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit policy for column widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Disable to keep the default column width.
    pub if_autofit: bool,
    /// Max body rows inspected; `None` inspects all rows.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            if_autofit: true,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    pub formats: SpecXlsxFormats,
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Freeze the header row of every sheet.
    pub if_freeze_header: bool,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            formats: crate::conf::derive_default_xlsx_formats(),
            policy_autofit: SpecAutofitCellsPolicy::default(),
            if_freeze_header: true,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// One sheet written to the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Body rows, header excluded.
    pub n_rows: usize,
    pub n_cols: usize,
}

/// Writer report over all sheets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
