//! Bundle-cell decomposition: one cell, several `(item, count)` pairs.

use regex::Regex;

use crate::cell::derive_cell_text;
use crate::coerce::{coerce_quantity, sum_digit_runs};
use crate::conf::TUP_BUNDLE_KEYWORDS;
use crate::spec::{EnumCellValue, SpecBundleRule};

/// Compiled keyword scanner for bundle cells such as `"InfoDesk(2) Showcase(1)"`.
#[derive(Debug, Clone)]
pub struct BundleCellParser {
    l_keywords: Vec<String>,
    re_bundle: Regex,
    re_qualifier: Regex,
}

impl BundleCellParser {
    /// Compile a parser for `keywords`; blank keywords are ignored.
    ///
    /// Longer keywords are tried first so overlapping names resolve to the
    /// most specific one.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, String> {
        let mut l_keywords: Vec<String> = Vec::new();
        for keyword in keywords {
            let c_keyword = keyword.as_ref().trim();
            if !c_keyword.is_empty() && !l_keywords.iter().any(|c| c == c_keyword) {
                l_keywords.push(c_keyword.to_string());
            }
        }
        if l_keywords.is_empty() {
            return Err("Bundle keyword set must contain >= 1 non-blank keyword.".to_string());
        }

        let mut l_alternation = l_keywords.clone();
        l_alternation.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let c_alternation = l_alternation
            .iter()
            .map(|c| regex::escape(c))
            .collect::<Vec<_>>()
            .join("|");

        let re_bundle = Regex::new(&format!(
            r"(?P<name>{c_alternation})\s*(?:[(（]\s*(?P<count>[0-9]+)\s*[)）])?"
        ))
        .map_err(|err| format!("Invalid bundle keyword pattern: {err}"))?;
        let re_qualifier = Regex::new(r"[(（][^)）]*[)）]")
            .map_err(|err| format!("Invalid qualifier pattern: {err}"))?;

        Ok(Self {
            l_keywords,
            re_bundle,
            re_qualifier,
        })
    }

    /// Parser over [`TUP_BUNDLE_KEYWORDS`].
    pub fn with_default_keywords() -> Result<Self, String> {
        Self::new(&TUP_BUNDLE_KEYWORDS)
    }

    pub fn keywords(&self) -> &[String] {
        &self.l_keywords
    }

    pub fn contains_keyword(&self, text: &str) -> bool {
        self.re_bundle.is_match(text)
    }

    /// One pair per keyword occurrence carrying a parenthesized count.
    pub fn scan_bundle(&self, text: &str) -> Vec<(String, u64)> {
        self.re_bundle
            .captures_iter(text)
            .filter_map(|caps| {
                let count = caps.name("count")?;
                Some((caps["name"].to_string(), sum_digit_runs(count.as_str())))
            })
            .collect()
    }

    /// Decompose one item row into canonical `(name, quantity)` pairs.
    ///
    /// 1. textual quantity cell containing a keyword → scan the quantity cell;
    /// 2. name with a parenthesized qualifier → scan the name cell, falling
    ///    through when nothing counted matches;
    /// 3. otherwise one pair of the trimmed name and the coerced quantity.
    pub fn expand(
        &self,
        cell_name: &EnumCellValue,
        cell_qty: &EnumCellValue,
        rule: &SpecBundleRule,
    ) -> Vec<(String, u64)> {
        if rule.if_scan_quantity
            && let EnumCellValue::String(c_qty) = cell_qty
            && self.contains_keyword(c_qty)
        {
            return self.scan_bundle(c_qty);
        }

        let c_name = derive_cell_text(cell_name);
        if rule.if_scan_name && self.re_qualifier.is_match(&c_name) {
            let l_pairs = self.scan_bundle(&c_name);
            if !l_pairs.is_empty() {
                return l_pairs;
            }
        }

        if c_name.is_empty() {
            return vec![];
        }
        vec![(c_name, coerce_quantity(cell_qty))]
    }
}
