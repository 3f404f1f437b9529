//! In-memory 2-D cell grid and cell rendering helpers.

use crate::spec::{EnumCellValue, TypeCellCoord};

static CELL_NONE: EnumCellValue = EnumCellValue::None;

/// Zero-indexed, ragged-tolerant worksheet grid.
///
/// Reads outside the materialized area return [`EnumCellValue::None`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecGrid {
    l_rows: Vec<Vec<EnumCellValue>>,
    n_cols: usize,
}

impl SpecGrid {
    /// Wrap row-major cells; rows may differ in length.
    pub fn new(l_rows: Vec<Vec<EnumCellValue>>) -> Self {
        let n_cols = l_rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { l_rows, n_cols }
    }

    /// Number of materialized rows.
    pub fn height(&self) -> usize {
        self.l_rows.len()
    }

    /// Width of the widest materialized row.
    pub fn width(&self) -> usize {
        self.n_cols
    }

    pub fn cell(&self, row_idx: usize, col_idx: usize) -> &EnumCellValue {
        self.l_rows
            .get(row_idx)
            .and_then(|row| row.get(col_idx))
            .unwrap_or(&CELL_NONE)
    }

    pub fn cell_at(&self, coord: TypeCellCoord) -> &EnumCellValue {
        self.cell(coord.0, coord.1)
    }

    /// Set one cell, growing the grid as needed.
    pub fn set_cell(&mut self, row_idx: usize, col_idx: usize, value: EnumCellValue) {
        if self.l_rows.len() <= row_idx {
            self.l_rows.resize_with(row_idx + 1, Vec::new);
        }
        let row = &mut self.l_rows[row_idx];
        if row.len() <= col_idx {
            row.resize(col_idx + 1, EnumCellValue::None);
        }
        row[col_idx] = value;
        self.n_cols = usize::max(self.n_cols, col_idx + 1);
    }

    /// Builder form of [`Self::set_cell`].
    pub fn with_cell(mut self, row_idx: usize, col_idx: usize, value: EnumCellValue) -> Self {
        self.set_cell(row_idx, col_idx, value);
        self
    }

    pub fn rows(&self) -> &[Vec<EnumCellValue>] {
        &self.l_rows
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        EnumCellValue::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        EnumCellValue::Number(value)
    }
}

/// `true` for missing cells, whitespace-only text and NaN.
pub fn is_blank_cell(value: &EnumCellValue) -> bool {
    match value {
        EnumCellValue::None => true,
        EnumCellValue::String(s) => s.trim().is_empty(),
        EnumCellValue::Number(n) => n.is_nan(),
    }
}

/// Render a cell as trimmed display text.
///
/// Integral numbers are printed without a fractional part so that numeric
/// booth numbers and phone numbers read as typed.
pub fn derive_cell_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(s) => s.trim().to_string(),
        EnumCellValue::Number(n) => {
            if n.is_nan() {
                String::new()
            } else if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_outside_grid_is_none() {
        let grid = SpecGrid::new(vec![vec!["a".into()], vec![]]);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.cell(1, 0), &EnumCellValue::None);
        assert_eq!(grid.cell(40, 12), &EnumCellValue::None);
    }

    #[test]
    fn test_set_cell_grows_ragged_rows() {
        let grid = SpecGrid::default().with_cell(3, 5, 2.0.into());
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.cell_at((3, 5)), &EnumCellValue::Number(2.0));
        assert_eq!(grid.rows()[0].len(), 0);
    }

    #[test]
    fn test_derive_cell_text_drops_integral_fraction() {
        assert_eq!(derive_cell_text(&EnumCellValue::Number(1012345678.0)), "1012345678");
        assert_eq!(derive_cell_text(&EnumCellValue::Number(2.5)), "2.5");
        assert_eq!(derive_cell_text(&EnumCellValue::Number(f64::NAN)), "");
        assert_eq!(derive_cell_text(&"  A-12 ".into()), "A-12");
    }

    #[test]
    fn test_is_blank_cell() {
        assert!(is_blank_cell(&EnumCellValue::None));
        assert!(is_blank_cell(&" \t".into()));
        assert!(is_blank_cell(&EnumCellValue::Number(f64::NAN)));
        assert!(!is_blank_cell(&EnumCellValue::Number(0.0)));
    }
}
