//! Manufacturer prefix matching and brand selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{BrandSelection, ManufacturerRecord};

/// Manufacturers that passed the prefix filter and the brands they contribute
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrandFilterResult {
    /// Matching manufacturers, in input order
    pub matched: Vec<ManufacturerRecord>,
    /// One selection per brand of every matched manufacturer,
    /// manufacturer-then-brand order
    pub selections: Vec<BrandSelection>,
}

/// Keep manufacturers whose name starts with any of `prefixes`.
///
/// Matching is case-sensitive. Manufacturers without a name never match.
/// Duplicate brands are passed through as-is.
pub fn filter_manufacturers<S: AsRef<str>>(
    manufacturers: &[ManufacturerRecord],
    prefixes: &[S],
) -> BrandFilterResult {
    let mut result = BrandFilterResult::default();

    for manufacturer in manufacturers {
        let name = manufacturer.manufacturer_name.as_str();
        if name.is_empty() || !prefixes.iter().any(|p| name.starts_with(p.as_ref())) {
            continue;
        }

        result
            .selections
            .extend(manufacturer.brands.iter().map(|brand| BrandSelection {
                manufacturer_id: manufacturer.manufacturer_id,
                manufacturer_brand_id: brand.brand_id,
            }));
        result.matched.push(manufacturer.clone());
    }

    result
}

/// A `(manufacturer, brand)` pair for manual brand selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandEntry {
    /// Manufacturer identifier
    #[serde(rename = "manufacturerID")]
    pub manufacturer_id: i64,
    /// Manufacturer display name
    pub manufacturer_name: String,
    /// Brand identifier
    #[serde(rename = "brandID")]
    pub brand_id: i64,
    /// Brand display name
    pub brand_name: String,
}

/// Flatten every brand of every manufacturer
pub fn brand_entries(manufacturers: &[ManufacturerRecord]) -> Vec<BrandEntry> {
    manufacturers
        .iter()
        .flat_map(|m| {
            m.brands.iter().map(move |b| BrandEntry {
                manufacturer_id: m.manufacturer_id,
                manufacturer_name: m.manufacturer_name.clone(),
                brand_id: b.brand_id,
                brand_name: b.brand_name.clone(),
            })
        })
        .collect()
}

/// Build the selection list for the brand IDs a user ticked
pub fn selections_for_brands(
    entries: &[BrandEntry],
    selected_brand_ids: &HashSet<i64>,
) -> Vec<BrandSelection> {
    entries
        .iter()
        .filter(|e| selected_brand_ids.contains(&e.brand_id))
        .map(|e| BrandSelection {
            manufacturer_id: e.manufacturer_id,
            manufacturer_brand_id: e.brand_id,
        })
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BrandRecord;

    const PREFIXES: [&str; 5] = ["Advance/", "Worldpac", "OE+", "Carquest/", "AZ/"];

    fn manufacturer(id: i64, name: &str, brand_ids: &[i64]) -> ManufacturerRecord {
        ManufacturerRecord {
            manufacturer_id: id,
            manufacturer_name: name.to_string(),
            brands: brand_ids
                .iter()
                .map(|&b| BrandRecord {
                    brand_id: b,
                    brand_name: format!("brand {b}"),
                })
                .collect(),
        }
    }

    fn sample() -> Vec<ManufacturerRecord> {
        vec![
            manufacturer(1, "Advance/Carquest", &[11, 12]),
            manufacturer(2, "Bosch", &[21]),
            manufacturer(3, "Worldpac Direct", &[31]),
            manufacturer(4, "oe+ lowercase", &[41]),
            manufacturer(5, "", &[51]),
            manufacturer(6, "AZ/Duralast", &[]),
        ]
    }

    #[test]
    fn test_matched_names_start_with_a_prefix() {
        let result = filter_manufacturers(&sample(), &PREFIXES);

        let ids: Vec<i64> = result.matched.iter().map(|m| m.manufacturer_id).collect();
        assert_eq!(ids, vec![1, 3, 6]);
        for m in &result.matched {
            assert!(PREFIXES.iter().any(|p| m.manufacturer_name.starts_with(p)));
        }
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let result = filter_manufacturers(&sample(), &PREFIXES);
        assert!(result.matched.iter().all(|m| m.manufacturer_id != 4));
    }

    #[test]
    fn test_selection_count_is_sum_of_matched_brands() {
        let result = filter_manufacturers(&sample(), &PREFIXES);
        let expected: usize = result.matched.iter().map(|m| m.brands.len()).sum();

        assert_eq!(result.selections.len(), expected);
        assert_eq!(
            result.selections,
            vec![
                BrandSelection {
                    manufacturer_id: 1,
                    manufacturer_brand_id: 11
                },
                BrandSelection {
                    manufacturer_id: 1,
                    manufacturer_brand_id: 12
                },
                BrandSelection {
                    manufacturer_id: 3,
                    manufacturer_brand_id: 31
                },
            ]
        );
    }

    #[test]
    fn test_prefix_order_does_not_matter() {
        let mut reversed = PREFIXES;
        reversed.reverse();
        assert_eq!(
            filter_manufacturers(&sample(), &PREFIXES),
            filter_manufacturers(&sample(), &reversed)
        );
    }

    #[test]
    fn test_duplicate_brands_are_tolerated() {
        let input = vec![manufacturer(1, "OE+ Parts", &[7, 7])];
        let result = filter_manufacturers(&input, &PREFIXES);
        assert_eq!(result.selections.len(), 2);
        assert_eq!(result.selections[0], result.selections[1]);
    }

    #[test]
    fn test_no_match_yields_empty_result() {
        let input = vec![manufacturer(2, "Bosch", &[21])];
        assert_eq!(
            filter_manufacturers(&input, &PREFIXES),
            BrandFilterResult::default()
        );
    }

    #[test]
    fn test_manual_brand_selection() {
        let entries = brand_entries(&sample());
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].manufacturer_name, "Advance/Carquest");
        assert_eq!(entries[2].brand_id, 21);

        let ticked: HashSet<i64> = [12, 31, 999].into_iter().collect();
        let selections = selections_for_brands(&entries, &ticked);
        assert_eq!(
            selections,
            vec![
                BrandSelection {
                    manufacturer_id: 1,
                    manufacturer_brand_id: 12
                },
                BrandSelection {
                    manufacturer_id: 3,
                    manufacturer_brand_id: 31
                },
            ]
        );
    }
}
