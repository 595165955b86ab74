//! Core catalog types for catalog-export
//!
//! Wire shapes mirror the remote API's JSON (`categoryID`, `manufacturerBrandID`, ...).
//! The API is loose about scalar types, so IDs accept numbers or numeric strings
//! and free-text fields accept strings, numbers, or null.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Category tree as returned by `GET /api/parts/category-tree`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoryTree {
    /// Top-level categories; `None` when the payload has no `data` collection
    #[serde(default)]
    pub data: Option<Vec<Category>>,
}

/// A top-level category of the catalog tree
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier
    #[serde(rename = "categoryID", deserialize_with = "lenient::id")]
    pub category_id: i64,
    /// Display name
    #[serde(rename = "categoryName", default, deserialize_with = "lenient::text")]
    pub category_name: String,
    /// Groups under this category; `None` when the category carries no `groups` array
    #[serde(default)]
    pub groups: Option<Vec<GroupNode>>,
}

/// A group node of the catalog tree
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupNode {
    /// Group identifier
    #[serde(rename = "groupID", deserialize_with = "lenient::id")]
    pub group_id: i64,
    /// Display name, if the API sent one
    #[serde(rename = "groupName", default)]
    pub group_name: Option<String>,
    /// Leaf catalog objects under this group
    #[serde(
        rename = "catalogObjects",
        default,
        deserialize_with = "lenient::vec_or_null"
    )]
    pub catalog_objects: Vec<CatalogObject>,
}

impl GroupNode {
    /// The group's name, or `Group <id>` when the API left it out
    pub fn display_name(&self) -> String {
        match self.group_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Group {}", self.group_id),
        }
    }
}

/// A leaf of the catalog tree
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogObject {
    /// Catalog object identifier
    #[serde(rename = "catalogObjectID", deserialize_with = "lenient::id")]
    pub catalog_object_id: i64,
    /// Display name
    #[serde(
        rename = "catalogObjectName",
        default,
        deserialize_with = "lenient::text"
    )]
    pub catalog_object_name: String,
}

impl CategoryTree {
    /// Find a group node anywhere in the tree
    pub fn find_group(&self, group_id: i64) -> Option<(&Category, &GroupNode)> {
        self.categories().find_map(|category| {
            category
                .groups
                .iter()
                .flatten()
                .find(|g| g.group_id == group_id)
                .map(|g| (category, g))
        })
    }

    /// Find a catalog object together with the category and group that own it
    pub fn find_catalog_object(
        &self,
        catalog_object_id: i64,
    ) -> Option<(&Category, &GroupNode, &CatalogObject)> {
        self.categories().find_map(|category| {
            category.groups.iter().flatten().find_map(|group| {
                group
                    .catalog_objects
                    .iter()
                    .find(|o| o.catalog_object_id == catalog_object_id)
                    .map(|o| (category, group, o))
            })
        })
    }

    fn categories(&self) -> impl Iterator<Item = &Category> {
        self.data.iter().flatten()
    }
}

/// One unit of export work: a group and the category it belongs to
///
/// Produced once per run from the tree snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGroup {
    /// Group identifier (identity)
    #[serde(rename = "groupID")]
    pub group_id: i64,
    /// Group display name
    pub group_name: String,
    /// Owning category identifier
    #[serde(rename = "categoryID")]
    pub category_id: i64,
    /// Owning category name
    pub category_name: String,
}

/// A manufacturer offering parts for a catalog scope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturerRecord {
    /// Manufacturer identifier
    #[serde(rename = "manufacturerID", deserialize_with = "lenient::id")]
    pub manufacturer_id: i64,
    /// Manufacturer display name (empty when the API sent none)
    #[serde(
        rename = "manufacturerName",
        default,
        deserialize_with = "lenient::text"
    )]
    pub manufacturer_name: String,
    /// Brands this manufacturer carries for the scope
    #[serde(default, deserialize_with = "lenient::vec_or_null")]
    pub brands: Vec<BrandRecord>,
}

/// A brand of a manufacturer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRecord {
    /// Brand identifier
    #[serde(rename = "brandID", deserialize_with = "lenient::id")]
    pub brand_id: i64,
    /// Brand display name
    #[serde(rename = "brandName", default, deserialize_with = "lenient::text")]
    pub brand_name: String,
}

/// "Include this brand from this manufacturer" in a parts-fitment query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandSelection {
    /// Manufacturer identifier
    #[serde(rename = "manufacturerID")]
    pub manufacturer_id: i64,
    /// Brand identifier
    #[serde(rename = "manufacturerBrandID")]
    pub manufacturer_brand_id: i64,
}

/// Customer catalog list: the brand filter sent in the `X-CCL` header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ccl {
    /// Always 1 for the client-built list
    #[serde(rename = "cclID")]
    pub ccl_id: i64,
    /// Always "virtual CCL" for the client-built list
    pub name: String,
    /// Included manufacturer/brand pairs
    #[serde(rename = "cclDetails")]
    pub ccl_details: Vec<BrandSelection>,
}

impl Ccl {
    /// Build the virtual CCL for a selection list; `None` when nothing is selected
    pub fn from_selections(selections: Vec<BrandSelection>) -> Option<Self> {
        if selections.is_empty() {
            return None;
        }
        Some(Self {
            ccl_id: 1,
            name: "virtual CCL".to_string(),
            ccl_details: selections,
        })
    }

    /// Whether the list selects no brand at all
    pub fn is_empty(&self) -> bool {
        self.ccl_details.is_empty()
    }
}

/// A part fitment returned by `GET /api/parts/get-part-fitments`
///
/// Only the fields the export reads are typed; everything else is kept in `extra`
/// for detail views.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Part {
    /// Part number
    #[serde(rename = "partNumber", default, deserialize_with = "lenient::text")]
    pub part_number: String,
    /// Part type (terminology)
    #[serde(
        rename = "partType",
        default,
        deserialize_with = "lenient::object_or_none"
    )]
    pub part_type: Option<PartType>,
    /// Mounting position
    #[serde(default, deserialize_with = "lenient::object_or_none")]
    pub position: Option<PartPosition>,
    /// Nested manufacturer object
    #[serde(default, deserialize_with = "lenient::object_or_none")]
    pub manufacturer: Option<PartManufacturer>,
    /// Flat manufacturer name, used when the nested object is missing
    #[serde(
        rename = "manufacturerName",
        default,
        deserialize_with = "lenient::text"
    )]
    pub manufacturer_name: String,
    /// Every other field of the fitment
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Part type terminology
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartType {
    /// Terminology name, e.g. "Oil Filter"
    #[serde(
        rename = "partTerminologyName",
        default,
        deserialize_with = "lenient::text"
    )]
    pub part_terminology_name: String,
}

/// Mounting position of a part
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartPosition {
    /// Position name, e.g. "Front"
    #[serde(default, deserialize_with = "lenient::text")]
    pub position: String,
}

/// Manufacturer as nested inside a part fitment
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartManufacturer {
    /// Manufacturer name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

/// The flat record exported per part
///
/// Missing source fields are empty strings, never absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPartRow {
    /// Part type terminology name
    #[serde(rename = "PartTypeTerminologyName")]
    pub part_type_terminology_name: String,
    /// Position name
    #[serde(rename = "PositionName")]
    pub position_name: String,
    /// Part number
    #[serde(rename = "PartNumber")]
    pub part_number: String,
    /// Manufacturer name
    #[serde(rename = "ManufacturerName")]
    pub manufacturer_name: String,
}

impl From<&Part> for ExtractedPartRow {
    fn from(part: &Part) -> Self {
        let nested_name = part
            .manufacturer
            .as_ref()
            .map(|m| m.name.as_str())
            .filter(|name| !name.is_empty());

        Self {
            part_type_terminology_name: part
                .part_type
                .as_ref()
                .map(|t| t.part_terminology_name.clone())
                .unwrap_or_default(),
            position_name: part
                .position
                .as_ref()
                .map(|p| p.position.clone())
                .unwrap_or_default(),
            part_number: part.part_number.clone(),
            manufacturer_name: nested_name
                .unwrap_or(part.manufacturer_name.as_str())
                .to_string(),
        }
    }
}

/// Which part of the catalog a manufacturer or parts query covers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogScope {
    /// Selected leaf catalog objects
    pub catalog_object_ids: Vec<i64>,
    /// Selected groups
    pub catalog_group_ids: Vec<i64>,
}

impl CatalogScope {
    /// A scope covering exactly one group
    pub fn for_group(group_id: i64) -> Self {
        Self {
            catalog_object_ids: Vec::new(),
            catalog_group_ids: vec![group_id],
        }
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.catalog_object_ids.is_empty() && self.catalog_group_ids.is_empty()
    }

    /// Append the scope's ID lists to a query string
    pub(crate) fn append_query(&self, query: &mut String) {
        for (key, ids) in [
            ("catalogObjectIDs", &self.catalog_object_ids),
            ("catalogGroupIDs", &self.catalog_group_ids),
        ] {
            if ids.is_empty() {
                continue;
            }
            let joined = ids
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            query.push_str(&format!("&{}={}", key, joined));
        }
    }
}

/// A 17-character vehicle identification number
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    /// Required VIN length
    pub const LEN: usize = 17;

    /// Parse user input, trimming surrounding whitespace
    pub fn parse(input: &str) -> Result<Self> {
        let vin = input.trim();
        if vin.is_empty() {
            return Err(Error::InvalidInput("please enter a VIN".to_string()));
        }
        if vin.chars().count() != Self::LEN {
            return Err(Error::InvalidInput(format!(
                "VIN must be {} characters long",
                Self::LEN
            )));
        }
        Ok(Self(vin.to_string()))
    }

    /// The VIN as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Vin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Vin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Outcome of a successful VIN decode
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VinDecoded {
    /// Opaque vehicle configuration sent back as `X-Vehicle-Configuration`
    pub vehicle_configuration: String,
    /// The full decode response, kept for display
    pub response: serde_json::Value,
}

/// Parameters of a part-detail lookup
#[derive(Clone, Debug, Default)]
pub struct PartDetailQuery {
    /// Part number (required)
    pub part_number: String,
    /// Manufacturer filter
    pub manufacturer_id: Option<i64>,
    /// Line code filter
    pub line_code: Option<String>,
    /// Catalog object the part was found under
    pub catalog_object_id: Option<i64>,
}

mod lenient {
    use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
    use serde_json::Value;

    pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| de::Error::custom(format!("ID out of range: {}", n))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("non-numeric ID: {:?}", s))),
            other => Err(de::Error::custom(format!("expected an ID, got {}", other))),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Nested objects that arrive as a bare string, number, or array read as absent
    pub fn object_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }
}
