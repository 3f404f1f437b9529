//! Per-document grouping of extracted records into a ledger.

use indexmap::{IndexMap, IndexSet};

use crate::spec::{SpecExtractedRecord, SpecItemRecord, SpecLedger};

#[derive(Debug, Default)]
struct SpecItemAccumulator {
    quantity: u64,
    line_total: u64,
    unit_price_lookup: u64,
    set_prices_explicit: IndexSet<u64>,
    set_notes: IndexSet<String>,
}

impl SpecItemAccumulator {
    fn resolve_unit_price(&self) -> u64 {
        match self.set_prices_explicit.len() {
            0 => self.unit_price_lookup,
            1 => self.set_prices_explicit[0],
            _ => self
                .set_prices_explicit
                .iter()
                .fold(0u64, |acc, n| acc.saturating_add(*n)),
        }
    }
}

/// Group `records` by exact trimmed item name, in first-seen order.
///
/// - quantity and line total are summed;
/// - the unit price is the common price, or the sum of the distinct explicit
///   prices when the sheet supplied more than one for the same name;
/// - notes are the distinct non-empty notes joined with `note_separator`.
pub fn aggregate_records(records: &[SpecExtractedRecord], note_separator: &str) -> SpecLedger {
    let mut dict_items: IndexMap<String, SpecItemAccumulator> = IndexMap::new();

    for record in records {
        let c_key = record.item_name.trim();
        if c_key.is_empty() {
            continue;
        }
        let acc = dict_items.entry(c_key.to_string()).or_default();

        acc.quantity = acc.quantity.saturating_add(record.quantity);
        acc.line_total = acc.line_total.saturating_add(record.line_total);
        if record.if_price_explicit {
            acc.set_prices_explicit.insert(record.unit_price);
        } else if acc.unit_price_lookup == 0 {
            acc.unit_price_lookup = record.unit_price;
        }

        let c_note = record.note.trim();
        if !c_note.is_empty() {
            acc.set_notes.insert(c_note.to_string());
        }
    }

    SpecLedger {
        items: dict_items
            .into_iter()
            .map(|(item_name, acc)| SpecItemRecord {
                unit_price: acc.resolve_unit_price(),
                item_name,
                quantity: acc.quantity,
                line_total: acc.line_total,
                note: acc
                    .set_notes
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(note_separator),
            })
            .collect(),
    }
}
