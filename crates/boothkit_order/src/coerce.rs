//! Quantity coercion for loosely-typed cells.

use crate::spec::EnumCellValue;

/// Convert a cell into a non-negative quantity. Never fails.
///
/// - empty → 0
/// - numeric → truncated toward zero; negative, NaN and infinite → 0
/// - text → sum of every maximal run of ASCII digits
///   (`"3, 5"` → 8, `"인포데스크(2)"` → 2)
///
/// Summing covers exhibitors typing additive lists into one field.
pub fn coerce_quantity(value: &EnumCellValue) -> u64 {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::Number(n) => coerce_number(*n),
        EnumCellValue::String(s) => sum_digit_runs(s),
    }
}

fn coerce_number(n: f64) -> u64 {
    if !n.is_finite() || n <= 0.0 {
        return 0;
    }
    n.trunc() as u64
}

/// Sum all maximal ASCII digit runs in `text`, saturating on overflow.
pub fn sum_digit_runs(text: &str) -> u64 {
    let mut n_total = 0u64;
    let mut n_run: Option<u64> = None;

    for chr in text.chars() {
        if let Some(n_digit) = chr.to_digit(10) {
            let n_prev = n_run.unwrap_or(0);
            n_run = Some(
                n_prev
                    .saturating_mul(10)
                    .saturating_add(u64::from(n_digit)),
            );
        } else if let Some(n_value) = n_run.take() {
            n_total = n_total.saturating_add(n_value);
        }
    }

    if let Some(n_value) = n_run {
        n_total = n_total.saturating_add(n_value);
    }
    n_total
}
