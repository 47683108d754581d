//! Record types for the three shop collections

mod contact;
mod order;
mod product;

use serde::{Deserialize, Deserializer};

pub use contact::*;
pub use order::*;
pub use product::*;

/// Text columns that may come back as `null`
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional text columns where an empty string means absent
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}
