//! Unit-price resolution and line totals.

use crate::cell::is_blank_cell;
use crate::coerce::coerce_quantity;
use crate::spec::{EnumCellValue, SpecPriceTable};

/// Parse an explicit price cell; `None` when the cell carries no price.
///
/// Thousands separators and whitespace are stripped before coercion, so
/// `"10,000"` and `"10,000원"` both read as 10 000. Text without any ASCII
/// digit (`"-"`, `"별도"`) is not a price.
pub fn parse_explicit_price(cell_price: &EnumCellValue) -> Option<u64> {
    if is_blank_cell(cell_price) {
        return None;
    }
    match cell_price {
        EnumCellValue::String(s) => {
            let c_stripped: String = s
                .chars()
                .filter(|chr| *chr != ',' && !chr.is_whitespace())
                .collect();
            if !c_stripped.chars().any(|chr| chr.is_ascii_digit()) {
                return None;
            }
            if let Ok(n_value) = c_stripped.parse::<f64>() {
                return Some(coerce_quantity(&EnumCellValue::Number(n_value)));
            }
            Some(coerce_quantity(&EnumCellValue::String(c_stripped)))
        }
        other => Some(coerce_quantity(other)),
    }
}

/// Resolve the unit price of one record.
///
/// Returns `(unit_price, if_price_explicit)`. Explicit prices win; otherwise
/// the static table is consulted and unknown names resolve to 0.
pub fn resolve_unit_price(
    price_table: &SpecPriceTable,
    item_name: &str,
    cell_price: &EnumCellValue,
) -> (u64, bool) {
    if let Some(n_price) = parse_explicit_price(cell_price) {
        return (n_price, true);
    }
    (price_table.get(item_name).unwrap_or(0), false)
}

/// `quantity × unit_price`, saturating.
pub fn calculate_line_total(quantity: u64, unit_price: u64) -> u64 {
    quantity.saturating_mul(unit_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SpecPriceTable {
        [("의자", 5_000u64), ("Cabinet", 40_000)].into_iter().collect()
    }

    #[test]
    fn test_explicit_price_strips_separators() {
        assert_eq!(parse_explicit_price(&"10,000".into()), Some(10_000));
        assert_eq!(parse_explicit_price(&"1,200,000원".into()), Some(1_200_000));
        assert_eq!(parse_explicit_price(&" 7 500 ".into()), Some(7_500));
        assert_eq!(parse_explicit_price(&"15000.0".into()), Some(15_000));
        assert_eq!(parse_explicit_price(&EnumCellValue::Number(9_900.0)), Some(9_900));
    }

    #[test]
    fn test_blank_explicit_price_is_absent() {
        assert_eq!(parse_explicit_price(&EnumCellValue::None), None);
        assert_eq!(parse_explicit_price(&" ".into()), None);
        assert_eq!(parse_explicit_price(&",".into()), None);
        assert_eq!(parse_explicit_price(&"-".into()), None);
        assert_eq!(parse_explicit_price(&"문의".into()), None);
        assert_eq!(parse_explicit_price(&"별도".into()), None);
    }

    #[test]
    fn test_placeholder_price_text_uses_table() {
        assert_eq!(resolve_unit_price(&table(), "의자", &"-".into()), (5_000, false));
        assert_eq!(resolve_unit_price(&table(), "Cabinet", &"문의".into()), (40_000, false));
    }

    #[test]
    fn test_resolve_prefers_explicit_then_table() {
        assert_eq!(resolve_unit_price(&table(), "의자", &"6,000".into()), (6_000, true));
        assert_eq!(resolve_unit_price(&table(), "의자", &EnumCellValue::None), (5_000, false));
        assert_eq!(resolve_unit_price(&table(), "unknown", &EnumCellValue::None), (0, false));
    }

    #[test]
    fn test_line_total_saturates() {
        assert_eq!(calculate_line_total(2, 10_000), 20_000);
        assert_eq!(calculate_line_total(u64::MAX, 2), u64::MAX);
    }
}
