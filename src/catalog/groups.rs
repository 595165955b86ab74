//! Flattening of the category tree into the ordered export work list.

use crate::error::{Error, Result};
use crate::types::{CatalogGroup, CategoryTree};

/// Flatten a category tree into `(group, parent category)` pairs.
///
/// Order follows the input: categories as listed, groups within each category
/// as listed. Categories without a `groups` array are skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidTree`] when the tree has no `data` collection, when
/// no category carries a `groups` array, or when the tree holds no groups at all.
pub fn extract_groups(tree: &CategoryTree) -> Result<Vec<CatalogGroup>> {
    let categories = tree
        .data
        .as_ref()
        .ok_or_else(|| Error::InvalidTree("category tree data not available".to_string()))?;

    let mut saw_group_collection = false;
    let mut groups = Vec::new();

    for category in categories {
        let Some(nodes) = &category.groups else {
            continue;
        };
        saw_group_collection = true;

        groups.extend(nodes.iter().map(|node| CatalogGroup {
            group_id: node.group_id,
            group_name: node.display_name(),
            category_id: category.category_id,
            category_name: category.category_name.clone(),
        }));
    }

    if !saw_group_collection {
        return Err(Error::InvalidTree(
            "no category in the tree carries a groups collection".to_string(),
        ));
    }
    if groups.is_empty() {
        return Err(Error::InvalidTree(
            "no groups found in category tree".to_string(),
        ));
    }

    Ok(groups)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> CategoryTree {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_preserves_input_order_across_categories() {
        let tree = tree(json!({
            "data": [
                { "categoryID": 2, "categoryName": "Engine", "groups": [
                    { "groupID": 30, "groupName": "Filters" },
                    { "groupID": 20, "groupName": "Belts" }
                ]},
                { "categoryID": 1, "categoryName": "Brakes", "groups": [
                    { "groupID": 10, "groupName": "Pads" }
                ]}
            ]
        }));

        let groups = extract_groups(&tree).unwrap();
        let ids: Vec<i64> = groups.iter().map(|g| g.group_id).collect();
        assert_eq!(ids, vec![30, 20, 10], "input order must not be re-sorted");

        assert_eq!(
            groups[2],
            CatalogGroup {
                group_id: 10,
                group_name: "Pads".into(),
                category_id: 1,
                category_name: "Brakes".into(),
            }
        );
    }

    #[test]
    fn test_returns_exactly_one_entry_per_group() {
        let categories: Vec<_> = (0..4)
            .map(|c| {
                let groups: Vec<_> = (0..c + 1)
                    .map(|g| json!({ "groupID": c * 100 + g, "groupName": format!("g{g}") }))
                    .collect();
                json!({ "categoryID": c, "categoryName": format!("c{c}"), "groups": groups })
            })
            .collect();

        let groups = extract_groups(&tree(json!({ "data": categories }))).unwrap();
        assert_eq!(groups.len(), 1 + 2 + 3 + 4);
    }

    #[test]
    fn test_skips_categories_without_groups_array() {
        let tree = tree(json!({
            "data": [
                { "categoryID": 1, "categoryName": "Empty" },
                { "categoryID": 2, "categoryName": "Full", "groups": [{ "groupID": 5 }] }
            ]
        }));

        let groups = extract_groups(&tree).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_name, "Group 5");
        assert_eq!(groups[0].category_name, "Full");
    }

    #[test]
    fn test_missing_data_is_invalid() {
        let err = extract_groups(&CategoryTree::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
    }

    #[test]
    fn test_no_group_collections_is_invalid() {
        let tree = tree(json!({ "data": [{ "categoryID": 1 }, { "categoryID": 2 }] }));
        assert!(matches!(extract_groups(&tree), Err(Error::InvalidTree(_))));
    }

    #[test]
    fn test_only_empty_group_collections_is_invalid() {
        let tree = tree(json!({ "data": [{ "categoryID": 1, "groups": [] }] }));
        assert!(matches!(extract_groups(&tree), Err(Error::InvalidTree(_))));
    }
}
