//! # Mock Framework
//!
//! Utilities for testing gateways and the cart service without a backend.
//!
//! Use [`create_mock_transport`] to get a transport and a receiver.
//! Then use [`expect_request`] to inspect each outgoing request and answer it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

use crate::error::ApiError;
use crate::gateway::{ApiRequest, ApiResponse, Transport};

pub type Responder = oneshot::Sender<Result<ApiResponse, ApiError>>;
pub type PendingRequest = (ApiRequest, Responder);

/// A transport whose requests land on a channel the test controls.
///
/// The test decides what each request returns and when, which makes
/// success, failure and out-of-order completion deterministic.
#[derive(Clone)]
pub struct MockTransport {
    sender: mpsc::Sender<PendingRequest>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send((request, respond_to))
            .await
            .map_err(|_| ApiError::Transport("Mock transport closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Transport("Mock responder dropped".to_string()))?
    }
}

pub fn create_mock_transport(buffer_size: usize) -> (Arc<MockTransport>, mpsc::Receiver<PendingRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (Arc::new(MockTransport { sender }), receiver)
}

/// Waits for the next outgoing request.
pub async fn expect_request(receiver: &mut mpsc::Receiver<PendingRequest>) -> Option<PendingRequest> {
    receiver.recv().await
}

/// A `200` carrying `{ success: true, cart }` built from `(productId, color, price, quantity)` lines.
pub fn cart_response(lines: &[(&str, &str, f64, u32)]) -> Result<ApiResponse, ApiError> {
    let items: Vec<Value> = lines
        .iter()
        .map(|(product_id, color, price, quantity)| {
            json!({
                "productId": product_id,
                "name": format!("Product {product_id}"),
                "brand": "Test",
                "price": price,
                "image": "",
                "size": null,
                "color": color,
                "quantity": quantity,
            })
        })
        .collect();
    let total_items: u32 = lines.iter().map(|line| line.3).sum();
    let total_price: f64 = lines.iter().map(|line| line.2 * f64::from(line.3)).sum();
    Ok(ApiResponse::new(
        200,
        json!({
            "success": true,
            "cart": { "items": items, "totalItems": total_items, "totalPrice": total_price }
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport() {
        let (transport, mut receiver) = create_mock_transport(10);

        let task = tokio::spawn(async move { transport.send(ApiRequest::get("/api/cart")).await });

        let (request, responder) = expect_request(&mut receiver).await.expect("Expected request");
        assert_eq!(request.path, "/api/cart");
        responder.send(cart_response(&[("p1", "Red", 10.0, 2)])).unwrap();

        let response = task.await.unwrap().unwrap();
        assert_eq!(response.body["cart"]["totalItems"], 2);
    }

    #[tokio::test]
    async fn dropped_responder_is_a_transport_error() {
        let (transport, mut receiver) = create_mock_transport(10);
        let task = tokio::spawn(async move { transport.send(ApiRequest::get("/api/cart")).await });
        drop(expect_request(&mut receiver).await);
        assert!(matches!(task.await.unwrap(), Err(ApiError::Transport(_))));
    }
}
