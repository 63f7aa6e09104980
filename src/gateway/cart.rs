use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, instrument};

use super::transport::{ApiRequest, Transport};
use super::{decode_field, expect_success};
use crate::domain::{Cart, CartKey};
use crate::error::ApiError;
use crate::session::Session;

/// One cart call against the backend. Every operation answers with the
/// complete server cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartOperation {
    Fetch,
    Add { key: CartKey, quantity: u32 },
    UpdateQuantity { key: CartKey, quantity: u32 },
    Remove { key: CartKey },
    Clear,
}

impl CartOperation {
    pub fn name(&self) -> &'static str {
        match self {
            CartOperation::Fetch => "fetch",
            CartOperation::Add { .. } => "add",
            CartOperation::UpdateQuantity { .. } => "update_quantity",
            CartOperation::Remove { .. } => "remove",
            CartOperation::Clear => "clear",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            CartOperation::Fetch => "Failed to fetch cart",
            CartOperation::Add { .. } => "Failed to add to cart",
            CartOperation::UpdateQuantity { .. } => "Failed to update quantity",
            CartOperation::Remove { .. } => "Failed to remove from cart",
            CartOperation::Clear => "Failed to clear cart",
        }
    }

    /// Only identity and quantity are sent; the backend prices the line itself.
    fn request(&self, token: String) -> ApiRequest {
        let request = match self {
            CartOperation::Fetch => ApiRequest::get("/api/cart"),
            CartOperation::Add { key, quantity } => ApiRequest::post("/api/cart/add").json(json!({
                "productId": key.product_id,
                "size": key.size,
                "color": key.color,
                "quantity": quantity,
            })),
            CartOperation::UpdateQuantity { key, quantity } => ApiRequest::patch("/api/cart/update")
                .json(json!({
                    "productId": key.product_id,
                    "size": key.size,
                    "color": key.color,
                    "quantity": quantity,
                })),
            CartOperation::Remove { key } => ApiRequest::delete("/api/cart/remove").json(json!({
                "productId": key.product_id,
                "size": key.size,
                "color": key.color,
            })),
            CartOperation::Clear => ApiRequest::delete("/api/cart/clear"),
        };
        request.bearer(Some(token))
    }
}

/// Cart endpoints of the storefront API.
#[derive(Clone)]
pub struct CartGateway {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl CartGateway {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session }
    }

    /// Runs `operation` and returns the server's cart.
    ///
    /// Fails with [`ApiError::AuthRequired`] before touching the transport
    /// when the session holds no token.
    #[instrument(name = "cart_gateway", fields(operation = operation.name()), skip(self, operation))]
    pub async fn execute(&self, operation: &CartOperation) -> Result<Cart, ApiError> {
        let Some(token) = self.session.token() else {
            debug!("No token in session");
            return Err(ApiError::AuthRequired);
        };

        debug!("Sending request");
        let response = self.transport.send(operation.request(token)).await?;
        let body = expect_success(response, operation.fallback_message()).map_err(|e| {
            error!(error = %e, "Cart request rejected");
            e
        })?;
        let cart: Cart = decode_field(&body, &["cart"], false)?;

        info!(
            total_items = cart.total_items,
            total_price = cart.total_price,
            lines = cart.items.len(),
            "Cart received"
        );
        Ok(cart)
    }

    pub async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.execute(&CartOperation::Fetch).await
    }

    pub async fn add_item(
        &self,
        product_id: &str,
        size: Option<&str>,
        color: &str,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        self.execute(&CartOperation::Add {
            key: CartKey::new(product_id, size, color),
            quantity,
        })
        .await
    }

    pub async fn update_quantity(
        &self,
        product_id: &str,
        size: Option<&str>,
        color: &str,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        self.execute(&CartOperation::UpdateQuantity {
            key: CartKey::new(product_id, size, color),
            quantity,
        })
        .await
    }

    pub async fn remove_item(
        &self,
        product_id: &str,
        size: Option<&str>,
        color: &str,
    ) -> Result<Cart, ApiError> {
        self.execute(&CartOperation::Remove {
            key: CartKey::new(product_id, size, color),
        })
        .await
    }

    pub async fn clear_cart(&self) -> Result<Cart, ApiError> {
        self.execute(&CartOperation::Clear).await
    }
}
