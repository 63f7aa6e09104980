use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::transport::{ApiRequest, Transport};
use super::{decode_field, expect_success, path_segment};
use crate::domain::{Product, ProductFilters};
use crate::error::ApiError;
use crate::session::Session;

/// Read-only product endpoints. The token is attached when present but not required.
#[derive(Clone)]
pub struct CatalogGateway {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl CatalogGateway {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<Vec<Product>, ApiError> {
        debug!("Sending request");
        let request = ApiRequest::get("/api/products")
            .query(filters.to_query())
            .bearer(self.session.token());
        let body = expect_success(self.transport.send(request).await?, "Failed to fetch products")?;
        let products: Vec<Product> = decode_field(&body, &["products"], true)?;
        info!(count = products.len(), "Products listed");
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        debug!("Sending request");
        let request = ApiRequest::get(format!("/api/products/{}", path_segment(id)))
            .bearer(self.session.token());
        let body = expect_success(self.transport.send(request).await?, "Failed to fetch product")?;
        decode_field(&body, &["product"], true)
    }
}
