use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

pub type PropertyId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsignationType {
    Rent,
    Sale,
}

impl ConsignationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Sale => "sale",
        }
    }
}

impl Display for ConsignationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsignationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rent" => Ok(Self::Rent),
            "sale" => Ok(Self::Sale),
            other => Err(format!("unknown consignation type: `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub city: String,
    pub address: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    #[serde(default)]
    pub rent_price: Option<f64>,
    #[serde(default)]
    pub sale_price: Option<f64>,
    pub consignation_type: ConsignationType,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Body of `POST /api/properties` and `PUT /api/properties/{id}`. Absent
/// prices are sent as explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPayload {
    pub title: String,
    pub description: String,
    pub city: String,
    pub address: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub rent_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub consignation_type: ConsignationType,
    pub images: Vec<ImageUrl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Debug for PaginatedResponse<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n items: `{}`, page `{}` of `{}`, total `{}`",
            self.data.len(),
            self.meta.current_page,
            self.meta.last_page,
            self.meta.total
        )
    }
}
