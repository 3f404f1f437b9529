//! Catalog and addenda window slicing.

use crate::cell::{SpecGrid, is_blank_cell};
use crate::meta::validate_grid_dimensions;
use crate::spec::{EnumCellValue, EnumRowSection, SpecRawRow, SpecTemplateLayout};

fn read_optional(grid: &SpecGrid, row_idx: usize, col_idx: Option<usize>) -> EnumCellValue {
    col_idx
        .map(|n_col| grid.cell(row_idx, n_col).clone())
        .unwrap_or_default()
}

/// Slice the item rows of one grid: catalog window first, then addenda.
///
/// Rows whose item-name cell is empty or blank are discarded in both passes.
pub fn extract_raw_rows(
    grid: &SpecGrid,
    layout: &SpecTemplateLayout,
) -> Result<Vec<SpecRawRow>, String> {
    validate_grid_dimensions(grid, layout)?;

    let cfg_catalog = &layout.catalog;
    let mut l_rows = Vec::new();

    for row_idx in cfg_catalog.row_start_inclusive..cfg_catalog.row_end_exclusive {
        let cell_name = grid.cell(row_idx, cfg_catalog.col_name);
        if is_blank_cell(cell_name) {
            continue;
        }
        l_rows.push(SpecRawRow {
            section: EnumRowSection::Catalog,
            row_idx,
            cell_name: cell_name.clone(),
            cell_qty_base: grid.cell(row_idx, cfg_catalog.col_qty_base).clone(),
            cell_qty_final: grid.cell(row_idx, cfg_catalog.col_qty_final).clone(),
            cell_note: read_optional(grid, row_idx, cfg_catalog.col_note),
            cell_price: read_optional(grid, row_idx, cfg_catalog.col_price),
        });
    }

    let Some(cfg_addenda) = &layout.addenda else {
        return Ok(l_rows);
    };

    for row_idx in cfg_addenda.row_start_inclusive..cfg_addenda.row_end_exclusive {
        let cell_name = grid.cell(row_idx, cfg_addenda.col_name);
        if is_blank_cell(cell_name) {
            continue;
        }
        let cell_qty = grid.cell(row_idx, cfg_addenda.col_qty).clone();
        l_rows.push(SpecRawRow {
            section: EnumRowSection::Addenda,
            row_idx,
            cell_name: cell_name.clone(),
            cell_qty_base: EnumCellValue::None,
            cell_qty_final: cell_qty,
            cell_note: read_optional(grid, row_idx, cfg_addenda.col_note),
            cell_price: grid.cell(row_idx, cfg_addenda.col_price).clone(),
        });
    }

    Ok(l_rows)
}

impl SpecRawRow {
    /// Requested quantity cell: final quantity, else the base quantity.
    pub fn cell_qty_requested(&self) -> &EnumCellValue {
        if is_blank_cell(&self.cell_qty_final) {
            &self.cell_qty_base
        } else {
            &self.cell_qty_final
        }
    }
}
