use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Closed set of catalog categories.
///
/// Stored and rendered by name (`GROCERY`, `PERSONAL_CARE`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Grocery,
    Beverages,
    Bakery,
    Dairy,
    Produce,
    Frozen,
    Snacks,
    Household,
    Home,
    PersonalCare,
    Electronics,
}

impl Category {
    /// Resolve free text to a category.
    ///
    /// Absent, blank and unrecognized input all resolve to `None`; an odd
    /// category never blocks a create or update. Matching is exact on the
    /// trimmed name.
    pub fn resolve(raw: Option<&str>) -> Option<Category> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

        match raw.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                tracing::debug!(category = raw, "Unrecognized category, storing none");
                None
            }
        }
    }
}
