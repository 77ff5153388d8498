use crate::error::{ConsoleError, FormError};
use crate::filter::clamp_price;
use requester::inventory::InventoryRequesterExt;
use requester::inventory::io::{ConsignationType, ImageUrl, Property, PropertyId, PropertyPayload};
use std::sync::Arc;
use tracing::{error, info};

pub const MAX_TEXT_LEN: usize = 255;
pub const MAX_ROOMS: i32 = 32_767;
pub const MAX_AREA: f64 = 99_999_999.99;

/// Create/edit form contents. `id` is set when editing an existing property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub id: Option<PropertyId>,
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
    pub images: Vec<String>,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            city: String::new(),
            address: String::new(),
            bedrooms: 1,
            bathrooms: 1,
            area: 40.0,
            rent_price: None,
            sale_price: None,
            consignation_type: ConsignationType::Rent,
            images: vec![String::new()],
        }
    }
}

impl From<&Property> for PropertyDraft {
    fn from(property: &Property) -> Self {
        let mut images = property
            .images
            .iter()
            .map(|image| image.url.clone())
            .collect::<Vec<_>>();
        if images.is_empty() {
            images.push(String::new());
        }

        Self {
            id: Some(property.id),
            title: property.title.clone(),
            description: property.description.clone(),
            city: property.city.clone(),
            address: property.address.clone(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area: property.area,
            rent_price: property.rent_price,
            sale_price: property.sale_price,
            consignation_type: property.consignation_type,
            images,
        }
    }
}

impl PropertyDraft {
    pub fn add_image(&mut self) {
        self.images.push(String::new());
    }

    /// The first slot always stays.
    pub fn remove_image(&mut self, index: usize) {
        if index > 0 && index < self.images.len() {
            self.images.remove(index);
        }
    }

    pub fn set_image(&mut self, index: usize, url: impl Into<String>) {
        if let Some(slot) = self.images.get_mut(index) {
            *slot = url.into();
        }
    }

    pub fn to_payload(&self) -> Result<PropertyPayload, FormError> {
        let mut images = self.images.iter().map(|url| url.trim());
        let first = images
            .next()
            .filter(|url| !url.is_empty())
            .ok_or(FormError::MissingImage)?;

        let images = std::iter::once(first)
            .chain(images.filter(|url| !url.is_empty()))
            .map(|url| ImageUrl {
                url: truncate(url),
            })
            .collect();

        Ok(PropertyPayload {
            title: truncate(&self.title),
            description: self.description.clone(),
            city: truncate(&self.city),
            address: truncate(&self.address),
            bedrooms: self.bedrooms.clamp(0, MAX_ROOMS),
            bathrooms: self.bathrooms.clamp(0, MAX_ROOMS),
            area: clamp_area(self.area),
            rent_price: self.rent_price.and_then(clamp_price),
            sale_price: self.sale_price.and_then(clamp_price),
            consignation_type: self.consignation_type,
            images,
        })
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_TEXT_LEN).collect()
}

fn clamp_area(area: f64) -> f64 {
    if area.is_nan() {
        return 0.0;
    }
    area.clamp(0.0, MAX_AREA)
}

/// Sends drafts to the property API.
pub struct PropertyEditor<R> {
    requester: Arc<R>,
}

impl<R> PropertyEditor<R>
where
    R: InventoryRequesterExt + Send + Sync,
{
    pub fn new(requester: Arc<R>) -> Self {
        Self { requester }
    }

    /// Creates the property when the draft has no id, updates it otherwise.
    pub async fn save(&self, draft: &PropertyDraft) -> Result<Property, ConsoleError> {
        let payload = draft.to_payload()?;
        let saved = match draft.id {
            None => self.requester.create_property(&payload).await,
            Some(id) => self.requester.update_property(id, &payload).await,
        }
        .map_err(|e| {
            let e = ConsoleError::Mutation(e);
            error!(id = ?draft.id, "{e}");
            e
        })?;

        info!(id = saved.id, created = draft.id.is_none(), "property saved");
        Ok(saved)
    }

    pub async fn delete(&self, id: PropertyId) -> Result<(), ConsoleError> {
        self.requester.delete_property(id).await.map_err(|e| {
            let e = ConsoleError::Mutation(e);
            error!(id, "{e}");
            e
        })?;

        info!(id, "property deleted");
        Ok(())
    }
}
