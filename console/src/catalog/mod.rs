pub mod cache;
pub mod lookup;

pub use cache::{Catalog, CityCatalogCache};
pub use lookup::{CityLookup, CityLookupExt};

use crate::error::CatalogFetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the city catalog. `id` is the catalog identifier when the
/// source provides one, otherwise the name, so every option is addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityOption {
    id: String,
    name: String,
}

impl CityOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for entries without a usable name.
    fn from_entry(entry: &Value) -> Option<Self> {
        let name = entry.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let id = match entry.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
            Some(Value::Number(id)) => id.to_string(),
            _ => name.to_string(),
        };
        Some(Self::new(id, name))
    }
}

/// Normalizes a raw catalog payload, keeping the source order.
pub fn parse_catalog(payload: Value) -> Result<Vec<CityOption>, CatalogFetchError> {
    let Value::Array(entries) = payload else {
        return Err(CatalogFetchError::Malformed(format!(
            "expected an array of cities, got `{}`",
            kind(&payload)
        )));
    };
    Ok(entries.iter().filter_map(CityOption::from_entry).collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
