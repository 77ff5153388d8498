//! Fakes shared by the unit tests of this crate.

use crate::catalog::CityOption;
use async_trait::async_trait;
use requester::catalog::CatalogRequesterExt;
use requester::error::RequesterError;
use requester::inventory::InventoryRequesterExt;
use requester::inventory::io::{
    ConsignationType, PageMeta, PaginatedResponse, Property, PropertyId, PropertyPayload,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn sample_catalog() -> Vec<CityOption> {
    vec![
        CityOption::new("1", "Bogotá"),
        CityOption::new("2", "Medellín"),
        CityOption::new("3", "Barranquilla"),
    ]
}

pub fn sample_payload() -> Value {
    json!([
        { "id": "1", "name": "Bogotá" },
        { "id": "2", "name": "Medellín" },
        { "id": "3", "name": "Barranquilla" }
    ])
}

/// Catalog source that answers from a queue of scripted payloads, one per
/// call, after `delay`. The last payload is repeated once the queue is down
/// to a single entry.
pub struct FakeCatalog {
    payloads: Mutex<VecDeque<Result<Value, String>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(payloads: Vec<Result<Value, String>>, delay: Duration) -> Self {
        Self {
            payloads: Mutex::new(payloads.into()),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn serving(payload: Value) -> Self {
        Self::new(vec![Ok(payload)], Duration::from_millis(50))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRequesterExt for FakeCatalog {
    async fn fetch_cities(&self) -> Result<Value, RequesterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut payloads = self.payloads.lock().unwrap();
            if payloads.len() > 1 {
                payloads.pop_front().unwrap()
            } else {
                payloads.front().cloned().unwrap()
            }
        };
        tokio::time::sleep(self.delay).await;
        next.map_err(|body| RequesterError::status(503, body))
    }
}

pub fn property(id: PropertyId, city: &str) -> Property {
    Property {
        id,
        title: format!("Inmueble {id}"),
        description: "Descripción".to_string(),
        city: city.to_string(),
        address: "Calle 10 # 5-20".to_string(),
        bedrooms: 2,
        bathrooms: 1,
        area: 60.0,
        rent_price: Some(1500000.0),
        sale_price: None,
        consignation_type: ConsignationType::Rent,
        images: vec![],
        created_at: None,
        updated_at: None,
    }
}

pub fn page_of(properties: Vec<Property>, current_page: u32, last_page: u32) -> PaginatedResponse<Property> {
    let total = properties.len() as u64;
    PaginatedResponse {
        data: properties,
        meta: PageMeta {
            current_page,
            per_page: 12,
            total,
            last_page,
        },
    }
}

/// Property API fake. Listing responses are keyed by the serialized query;
/// unknown queries answer an empty first page. Each query can get its own
/// latency, and queries listed in `failing` answer a 500.
#[derive(Default)]
pub struct FakeInventory {
    pub pages: HashMap<String, PaginatedResponse<Property>>,
    pub delays: HashMap<String, Duration>,
    pub failing: Vec<String>,
    pub fail_mutations: bool,
    pub queries: Mutex<Vec<String>>,
    pub created: Mutex<Vec<PropertyPayload>>,
    pub updated: Mutex<Vec<(PropertyId, PropertyPayload)>>,
    pub deleted: Mutex<Vec<PropertyId>>,
}

impl FakeInventory {
    fn stored(payload: &PropertyPayload, id: PropertyId) -> Property {
        Property {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            city: payload.city.clone(),
            address: payload.address.clone(),
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            area: payload.area,
            rent_price: payload.rent_price,
            sale_price: payload.sale_price,
            consignation_type: payload.consignation_type,
            images: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    fn mutation_result(&self) -> Result<(), RequesterError> {
        if self.fail_mutations {
            return Err(RequesterError::status(422, "title is required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryRequesterExt for FakeInventory {
    async fn fetch_properties(
        &self,
        query: &str,
    ) -> Result<PaginatedResponse<Property>, RequesterError> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.iter().any(|q| q == query) {
            return Err(RequesterError::status(500, "boom".to_string()));
        }
        Ok(self
            .pages
            .get(query)
            .cloned()
            .unwrap_or_else(|| page_of(vec![], 1, 1)))
    }

    async fn fetch_property(&self, id: PropertyId) -> Result<Property, RequesterError> {
        Ok(property(id, "Cali"))
    }

    async fn create_property(
        &self,
        payload: &PropertyPayload,
    ) -> Result<Property, RequesterError> {
        self.mutation_result()?;
        self.created.lock().unwrap().push(payload.clone());
        Ok(Self::stored(payload, 100))
    }

    async fn update_property(
        &self,
        id: PropertyId,
        payload: &PropertyPayload,
    ) -> Result<Property, RequesterError> {
        self.mutation_result()?;
        self.updated.lock().unwrap().push((id, payload.clone()));
        Ok(Self::stored(payload, id))
    }

    async fn delete_property(&self, id: PropertyId) -> Result<(), RequesterError> {
        self.mutation_result()?;
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}
