//! Pure helpers shared by the reader and the writer.

use boothkit_order::EnumCellValue;
use calamine::Data;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::SpecAutofitCellsPolicy;

/// Replace illegal characters, trim and cap to the Excel name length.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Display width in Excel character units; non-ASCII glyphs count ~1.6.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Clamp a measured width with the policy bounds and padding.
pub fn calculate_autofit_width(n_width_recorded: usize, policy: &SpecAutofitCellsPolicy) -> usize {
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy.width_cell_padding),
    )
}

/// Map one calamine cell onto the engine's cell model.
///
/// Dates stay serial numbers; error cells read as blank.
pub fn convert_data_to_cell_value(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::Int(n) => EnumCellValue::Number(*n as f64),
        Data::Float(n) => EnumCellValue::Number(*n),
        Data::DateTime(dt) => EnumCellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            EnumCellValue::String(s.clone())
        }
        Data::Bool(b) => EnumCellValue::String(if *b { "TRUE" } else { "FALSE" }.to_string()),
    }
}

pub(crate) fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

pub(crate) fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("  ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_unicode_width_weights_hangul() {
        assert_eq!(estimate_unicode_string_width("abc"), 3);
        assert_eq!(estimate_unicode_string_width("의자"), 3);
    }

    #[test]
    fn test_autofit_width_is_clamped() {
        let policy = SpecAutofitCellsPolicy::default();
        assert_eq!(calculate_autofit_width(0, &policy), 8);
        assert_eq!(calculate_autofit_width(20, &policy), 22);
        assert_eq!(calculate_autofit_width(500, &policy), 60);
    }

    #[test]
    fn test_convert_calamine_data() {
        assert_eq!(convert_data_to_cell_value(&Data::Empty), EnumCellValue::None);
        assert_eq!(convert_data_to_cell_value(&Data::Int(3)), EnumCellValue::Number(3.0));
        assert_eq!(
            convert_data_to_cell_value(&Data::String("의자".to_string())),
            EnumCellValue::String("의자".to_string())
        );
        assert_eq!(
            convert_data_to_cell_value(&Data::Bool(true)),
            EnumCellValue::String("TRUE".to_string())
        );
    }
}
