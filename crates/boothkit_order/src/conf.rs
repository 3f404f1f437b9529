//! Order-form constants and default preset factories.

use crate::spec::{
    EnumTemplateProfile, SpecAddendaLayout, SpecBundleRule, SpecCatalogLayout, SpecMergeOptions,
    SpecMetaLayout, SpecPriceTable, SpecTemplateLayout,
};

/// Company text used when the company cell is blank.
pub const C_COMPANY_PLACEHOLDER: &str = "company name unspecified";
/// Preferred worksheet name of every template revision.
pub const C_ORDER_SHEET_NAME: &str = "신청서";
/// Bundle item names recognised inside composite cells.
pub const TUP_BUNDLE_KEYWORDS: [&str; 7] = [
    "인포데스크",
    "쇼케이스",
    "캐비닛",
    "캐비넷",
    "InfoDesk",
    "Showcase",
    "Cabinet",
];

/// Default output sheet names.
pub const C_SHEET_LEDGER: &str = "Merged";
pub const C_SHEET_PIVOT: &str = "Pivot";
pub const C_SHEET_DETAIL: &str = "Detail";
/// Row-label column of the pivot table.
pub const C_PIVOT_LABEL_COLUMN: &str = "company";

const N_ROW_CATALOG_START: usize = 8;
const N_ROW_CATALOG_END: usize = 28;
const N_ROW_ADDENDA_START: usize = 30;
const N_ROW_ADDENDA_END: usize = 40;

/// Unit prices of the standard catalog (KRW).
const TUP_DEFAULT_PRICES: [(&str, u64); 18] = [
    ("인포데스크", 50_000),
    ("쇼케이스", 80_000),
    ("캐비닛", 40_000),
    ("캐비넷", 40_000),
    ("InfoDesk", 50_000),
    ("Showcase", 80_000),
    ("Cabinet", 40_000),
    ("의자", 5_000),
    ("접이식 의자", 4_000),
    ("원형 테이블", 20_000),
    ("사각 테이블", 15_000),
    ("상담 테이블 세트", 45_000),
    ("전기 (1kW)", 60_000),
    ("멀티탭", 5_000),
    ("스포트라이트", 15_000),
    ("카펫 (㎡)", 10_000),
    ("휴지통", 3_000),
    ("옷걸이", 7_000),
];

fn derive_meta_layout_v1() -> SpecMetaLayout {
    SpecMetaLayout {
        coord_company: (2, 2),
        coord_manager: (3, 2),
        coord_booth_number: (2, 6),
        coord_phone: (3, 6),
        coord_email: (4, 2),
        coord_note: (4, 6),
    }
}

fn derive_catalog_layout_v1(col_price: Option<usize>) -> SpecCatalogLayout {
    SpecCatalogLayout {
        row_start_inclusive: N_ROW_CATALOG_START,
        row_end_exclusive: N_ROW_CATALOG_END,
        col_name: 1,
        col_qty_base: 3,
        col_qty_final: 4,
        col_note: Some(6),
        col_price,
    }
}

fn derive_addenda_layout_v1() -> SpecAddendaLayout {
    SpecAddendaLayout {
        row_start_inclusive: N_ROW_ADDENDA_START,
        row_end_exclusive: N_ROW_ADDENDA_END,
        col_name: 1,
        col_qty: 4,
        col_price: 5,
        col_note: Some(6),
    }
}

/// Build the coordinate table of one template profile.
pub fn derive_template_layout(profile: EnumTemplateProfile) -> SpecTemplateLayout {
    let (catalog, addenda, bundle_rule) = match profile {
        EnumTemplateProfile::Legacy => (
            derive_catalog_layout_v1(None),
            None,
            SpecBundleRule::default(),
        ),
        EnumTemplateProfile::AddendaAware => (
            derive_catalog_layout_v1(Some(5)),
            Some(derive_addenda_layout_v1()),
            SpecBundleRule {
                if_scan_quantity: true,
                if_scan_name: true,
            },
        ),
        EnumTemplateProfile::BundleInName => (
            derive_catalog_layout_v1(None),
            None,
            SpecBundleRule {
                if_scan_quantity: false,
                if_scan_name: true,
            },
        ),
        EnumTemplateProfile::BundleInQuantity => (
            derive_catalog_layout_v1(None),
            Some(derive_addenda_layout_v1()),
            SpecBundleRule {
                if_scan_quantity: true,
                if_scan_name: false,
            },
        ),
    };

    SpecTemplateLayout {
        profile,
        sheet_name: C_ORDER_SHEET_NAME.to_string(),
        meta: derive_meta_layout_v1(),
        n_rows_min: catalog.row_start_inclusive + 1,
        n_cols_min: catalog.col_name + 1,
        catalog,
        addenda,
        bundle_rule,
    }
}

/// Build the static catalog price table.
pub fn derive_default_price_table() -> SpecPriceTable {
    TUP_DEFAULT_PRICES.into_iter().collect()
}

/// Build default merge options.
pub fn derive_default_merge_options() -> SpecMergeOptions {
    SpecMergeOptions::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_addenda_profiles_carry_addenda_window() {
        for profile in EnumTemplateProfile::ALL {
            let layout = derive_template_layout(profile);
            let if_expected = matches!(
                profile,
                EnumTemplateProfile::AddendaAware | EnumTemplateProfile::BundleInQuantity
            );
            assert_eq!(layout.addenda.is_some(), if_expected, "{profile}");
            assert_eq!(layout.n_rows_min, 9);
            assert_eq!(layout.n_cols_min, 2);
        }
    }

    #[test]
    fn test_addenda_window_starts_below_catalog() {
        let layout = derive_template_layout(EnumTemplateProfile::AddendaAware);
        let addenda = layout.addenda.expect("addenda window");
        assert!(addenda.row_start_inclusive >= layout.catalog.row_end_exclusive);
    }

    #[test]
    fn test_default_price_table_covers_bundle_keywords() {
        let table = derive_default_price_table();
        for keyword in TUP_BUNDLE_KEYWORDS {
            assert!(table.get(keyword).is_some(), "{keyword}");
        }
    }
}
