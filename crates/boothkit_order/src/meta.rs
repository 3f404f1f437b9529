//! Fixed-position exhibitor metadata extraction.

use crate::cell::{SpecGrid, derive_cell_text};
use crate::conf::C_COMPANY_PLACEHOLDER;
use crate::spec::{SpecBoothMeta, SpecTemplateLayout};

/// Reject grids too small to contain the profile's item table.
pub fn validate_grid_dimensions(grid: &SpecGrid, layout: &SpecTemplateLayout) -> Result<(), String> {
    if grid.height() < layout.n_rows_min || grid.width() < layout.n_cols_min {
        return Err(format!(
            "Grid {}x{} is smaller than the {} template minimum {}x{}.",
            grid.height(),
            grid.width(),
            layout.profile,
            layout.n_rows_min,
            layout.n_cols_min
        ));
    }
    Ok(())
}

/// Read the booth metadata block.
///
/// Missing or blank cells default to `""`; the company defaults to
/// [`C_COMPANY_PLACEHOLDER`]. Fails only for undersized grids.
pub fn extract_booth_meta(
    grid: &SpecGrid,
    layout: &SpecTemplateLayout,
) -> Result<SpecBoothMeta, String> {
    validate_grid_dimensions(grid, layout)?;

    let cfg_meta = &layout.meta;
    let read = |coord| derive_cell_text(grid.cell_at(coord));

    let mut c_company = read(cfg_meta.coord_company);
    if c_company.is_empty() {
        c_company = C_COMPANY_PLACEHOLDER.to_string();
    }

    Ok(SpecBoothMeta {
        company: c_company,
        manager: read(cfg_meta.coord_manager),
        booth_number: read(cfg_meta.coord_booth_number),
        phone: read(cfg_meta.coord_phone),
        email: read(cfg_meta.coord_email),
        note: read(cfg_meta.coord_note),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::derive_template_layout;
    use crate::spec::{EnumCellValue, EnumTemplateProfile};

    fn build_minimal_grid() -> SpecGrid {
        SpecGrid::default().with_cell(8, 1, "의자".into())
    }

    #[test]
    fn test_extract_reads_fixed_coordinates() {
        let layout = derive_template_layout(EnumTemplateProfile::AddendaAware);
        let grid = build_minimal_grid()
            .with_cell(2, 2, " Acme Dental ".into())
            .with_cell(3, 2, "Kim".into())
            .with_cell(2, 6, EnumCellValue::Number(104.0))
            .with_cell(3, 6, "010-1234-5678".into())
            .with_cell(4, 2, "kim@acme.test".into())
            .with_cell(4, 6, "corner booth".into());

        let meta = extract_booth_meta(&grid, &layout).unwrap();
        assert_eq!(meta.company, "Acme Dental");
        assert_eq!(meta.manager, "Kim");
        assert_eq!(meta.booth_number, "104");
        assert_eq!(meta.phone, "010-1234-5678");
        assert_eq!(meta.email, "kim@acme.test");
        assert_eq!(meta.note, "corner booth");
    }

    #[test]
    fn test_missing_cells_default_silently() {
        let layout = derive_template_layout(EnumTemplateProfile::Legacy);
        let meta = extract_booth_meta(&build_minimal_grid(), &layout).unwrap();
        assert_eq!(meta.company, C_COMPANY_PLACEHOLDER);
        assert_eq!(meta.manager, "");
        assert_eq!(meta.email, "");
    }

    #[test]
    fn test_undersized_grid_is_malformed() {
        let layout = derive_template_layout(EnumTemplateProfile::Legacy);
        let grid = SpecGrid::default().with_cell(2, 2, "Acme".into());
        let err = extract_booth_meta(&grid, &layout).unwrap_err();
        assert!(err.contains("smaller than the legacy template"), "{err}");
    }
}
