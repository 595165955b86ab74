//! Pure transforms over already-loaded catalog data.
//!
//! - [`groups`] - flattening the category tree into the export work list
//! - [`brand_filter`] - manufacturer prefix matching and brand selection

pub mod brand_filter;
pub mod groups;

pub use brand_filter::{
    BrandEntry, BrandFilterResult, brand_entries, filter_manufacturers, selections_for_brands,
};
pub use groups::extract_groups;
