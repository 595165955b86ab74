//! Category tree, manufacturers, part fitments, and part detail.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::CatalogClient;
use crate::error::{Error, Result};
use crate::session::SessionContext;
use crate::types::{CatalogScope, CategoryTree, Ccl, ManufacturerRecord, Part, PartDetailQuery};

/// `{ "data": [...] }` where `data` may be missing or null
#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct DataEnvelope<T> {
    #[serde(default)]
    data: Option<Vec<T>>,
}

impl CatalogClient {
    /// Fetch the category → group → catalog-object tree for the session's vehicle
    pub async fn category_tree(&self, session: &SessionContext) -> Result<CategoryTree> {
        let url = self.url("parts/category-tree");
        let tree: CategoryTree = self
            .send_json("category tree fetch", || {
                self.authed_get(&url, session)
                    .header("Accept", "application/json")
            })
            .await?;

        debug!(
            categories = tree.data.as_ref().map_or(0, Vec::len),
            "category tree loaded"
        );
        Ok(tree)
    }

    /// Fetch manufacturers offering parts for the selected objects and/or groups
    ///
    /// # Errors
    /// [`Error::InvalidInput`] for an empty scope, before any request is made.
    pub async fn manufacturers(
        &self,
        session: &SessionContext,
        scope: &CatalogScope,
    ) -> Result<Vec<ManufacturerRecord>> {
        if scope.is_empty() {
            return Err(Error::InvalidInput(
                "select at least one catalog object or group".into(),
            ));
        }

        let mut query = format!(
            "parts/manufacturers?regionIDs={}&allManufacturers=true&includeOem=true",
            self.api.region_id
        );
        scope.append_query(&mut query);
        let url = self.url(&query);

        let envelope: DataEnvelope<ManufacturerRecord> = self
            .send_json("manufacturers fetch", || self.authed_get(&url, session))
            .await?;

        let manufacturers = envelope.data.unwrap_or_default();
        debug!(count = manufacturers.len(), ?scope, "manufacturers loaded");
        Ok(manufacturers)
    }

    /// Fetch part fitments for the scope, filtered to the brands in `ccl`
    ///
    /// An empty CCL selects nothing, so no request is made. The API answers
    /// either `{ "data": [...] }` or a bare array; both are accepted.
    pub async fn part_fitments(
        &self,
        session: &SessionContext,
        scope: &CatalogScope,
        ccl: &Ccl,
    ) -> Result<Vec<Part>> {
        if ccl.is_empty() {
            return Ok(Vec::new());
        }
        if scope.is_empty() {
            return Err(Error::InvalidInput(
                "select at least one catalog object or group".into(),
            ));
        }

        let mut query = format!("parts/get-part-fitments?regionID={}", self.api.region_id);
        scope.append_query(&mut query);
        let url = self.url(&query);
        let ccl_header = serde_json::to_string(ccl)?;

        let payload: Value = self
            .send_json("parts fetch", || {
                self.authed_get(&url, session)
                    .header("Content-Type", "application/json")
                    .header("X-CCL", &ccl_header)
            })
            .await?;

        let parts = parts_from_payload(payload);
        debug!(
            count = parts.len(),
            brands = ccl.ccl_details.len(),
            "part fitments loaded"
        );
        Ok(parts)
    }

    /// Fetch the detail document of a single part
    ///
    /// # Errors
    /// [`Error::InvalidInput`] for a blank part number.
    pub async fn part_detail(
        &self,
        session: &SessionContext,
        query: &PartDetailQuery,
    ) -> Result<Value> {
        let part_number = query.part_number.trim();
        if part_number.is_empty() {
            return Err(Error::InvalidInput("part number is required".into()));
        }

        let mut path = format!(
            "parts/detail?partNumber={}",
            urlencoding::encode(part_number)
        );
        if let Some(id) = query.manufacturer_id {
            path.push_str(&format!("&manufacturerID={}", id));
        }
        if let Some(line_code) = query.line_code.as_deref().filter(|c| !c.is_empty()) {
            path.push_str(&format!("&lineCode={}", urlencoding::encode(line_code)));
        }
        if let Some(id) = query.catalog_object_id {
            path.push_str(&format!("&catalogObjectID={}", id));
        }
        let url = self.url(&path);

        self.send_json("part details fetch", || {
            self.authed_get(&url, session)
                .header("Accept", "application/json")
                .header("x-application-key", &self.api.application_key)
        })
        .await
    }
}

/// Normalize the two response shapes of the part-fitment endpoint
fn parts_from_payload(payload: Value) -> Vec<Part> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("unexpected parts response structure, treating as empty");
                return Vec::new();
            }
        },
        _ => {
            warn!("unexpected parts response structure, treating as empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let parts: Vec<Part> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(part) => Some(part),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed part fitment");
                None
            }
        })
        .collect();

    if parts.len() < total {
        debug!(kept = parts.len(), total, "dropped malformed part fitments");
    }
    parts
}
