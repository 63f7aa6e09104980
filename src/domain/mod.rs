//! Storefront data as the backend sends it.
//!
//! Decoding is lenient the same way the backend is inconsistent: ids may come
//! as `id` or `_id`, numbers may be missing or `null`, sizes may be numbers.

pub mod cart;
pub mod flash_sale;
pub mod home;
pub mod product;
pub mod user;

pub use cart::*;
pub use flash_sale::*;
pub use home::*;
pub use product::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Mongo documents carry `_id`; some endpoints also add a virtual `id`.
pub(crate) fn pick_id(id: Option<String>, mongo_id: Option<String>) -> Option<String> {
    id.filter(|id| !id.is_empty())
        .or(mongo_id.filter(|id| !id.is_empty()))
}

/// Treats an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accepts `"42"`, `42`, `42.5` or `null`; empty strings become `None`.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) if s.is_empty() => None,
        Some(StringOrNumber::String(s)) => Some(s),
        Some(StringOrNumber::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

/// Like [`opt_string_or_number`] for a list of sizes.
pub(crate) fn string_or_number_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<StringOrNumber>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        })
        .collect())
}
