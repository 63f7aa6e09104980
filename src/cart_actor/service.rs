use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn, Instrument};

use super::state::CartState;
use crate::clients::CartClient;
use crate::domain::{Cart, CartSnapshot};
use crate::error::{ApiError, CartError};
use crate::gateway::{CartGateway, CartOperation};
use crate::messages::{CartRequest, ServiceResponse};

/// Owns the cart state. Gateway calls run on spawned tasks and report back
/// through the service's own mailbox, so the loop never waits on the network.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    mailbox: mpsc::WeakSender<CartRequest>,
    gateway: CartGateway,
    state: CartState,
}

impl CartService {
    pub fn new(buffer_size: usize, gateway: CartGateway) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            mailbox: sender.downgrade(),
            gateway,
            state: CartState::default(),
        };
        let client = CartClient::new(sender);
        (service, client)
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!("CartService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::Sync {
                    operation,
                    respond_to,
                } => {
                    self.handle_sync(operation, respond_to);
                }
                CartRequest::Completed {
                    seq,
                    result,
                    respond_to,
                } => {
                    self.handle_completed(seq, result, respond_to);
                }
                CartRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.state.snapshot()));
                }
                CartRequest::Toggle { respond_to } => {
                    let open = self.state.toggle();
                    debug!(open, "Cart drawer toggled");
                    let _ = respond_to.send(Ok(open));
                }
                CartRequest::SetOpen { open, respond_to } => {
                    let _ = respond_to.send(Ok(self.state.set_open(open)));
                }
                CartRequest::Reset { respond_to } => {
                    self.state.reset();
                    info!("Cart reset");
                    let _ = respond_to.send(Ok(()));
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }

        info!("CartService stopped");
    }

    /// **Background Handler** - the spawned task owns `respond_to` and hands
    /// it back with the result, so ordering is decided here, not by the network.
    #[instrument(fields(operation = operation.name()), skip(self, operation, respond_to))]
    fn handle_sync(
        &mut self,
        operation: CartOperation,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    ) {
        let Some(mailbox) = self.mailbox.upgrade() else {
            error!("No open handles, dropping operation");
            let _ = respond_to.send(Err(CartError::ActorCommunicationError(
                "Cart service is closing".to_string(),
            )));
            return;
        };

        let seq = self.state.begin();
        debug!(seq, "Dispatching cart operation");

        let gateway = self.gateway.clone();
        let span = tracing::debug_span!("cart_operation", seq, operation = operation.name());
        tokio::spawn(
            async move {
                let result = gateway.execute(&operation).await;
                if mailbox
                    .send(CartRequest::Completed {
                        seq,
                        result,
                        respond_to,
                    })
                    .await
                    .is_err()
                {
                    warn!("CartService stopped before the operation completed");
                }
            }
            .instrument(span),
        );
    }

    #[instrument(skip(self, result, respond_to))]
    fn handle_completed(
        &mut self,
        seq: u64,
        result: Result<Cart, ApiError>,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    ) {
        match result {
            Ok(cart) => {
                if !cart.totals_consistent() {
                    warn!(
                        total_items = cart.total_items,
                        quantity_sum = cart.quantity_sum(),
                        total_price = cart.total_price,
                        price_sum = cart.price_sum(),
                        "Server cart totals disagree with its lines"
                    );
                }
                if self.state.apply(seq, cart) {
                    info!(
                        total_items = self.state.cart().total_items,
                        total_price = self.state.cart().total_price,
                        "Cart updated from server"
                    );
                } else {
                    debug!("Discarding stale cart response");
                }
                let _ = respond_to.send(Ok(self.state.snapshot()));
            }
            Err(e) => {
                if self.state.fail(seq, e.to_string()) {
                    error!(error = %e, "Cart operation failed");
                } else {
                    debug!(error = %e, "Superseded cart operation failed");
                }
                let _ = respond_to.send(Err(CartError::Api(e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CartKey;
    use crate::mock_framework::{cart_response, create_mock_transport, expect_request};
    use crate::session::Session;

    fn start(token: Option<&str>) -> (CartClient, tokio::sync::mpsc::Receiver<crate::mock_framework::PendingRequest>) {
        let (transport, receiver) = create_mock_transport(10);
        let gateway = CartGateway::new(transport, Session::new(token.map(str::to_string)));
        let (service, client) = CartService::new(16, gateway);
        tokio::spawn(service.run());
        (client, receiver)
    }

    #[tokio::test]
    async fn applies_server_cart_verbatim() {
        let (client, mut receiver) = start(Some("tok"));

        let c = client.clone();
        let task = tokio::spawn(async move { c.add_item(CartKey::new("p1", None, "Red"), 1).await });
        let (_, responder) = expect_request(&mut receiver).await.unwrap();
        responder.send(cart_response(&[("p1", "Red", 20.0, 1)])).unwrap();

        let snapshot = task.await.unwrap().unwrap();
        assert_eq!(snapshot.total_items(), 1);
        assert_eq!(snapshot.total_price(), 20.0);
        assert!(!snapshot.is_loading);
        assert_eq!(client.snapshot().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn is_loading_while_request_is_pending() {
        let (client, mut receiver) = start(Some("tok"));

        let c = client.clone();
        let task = tokio::spawn(async move { c.fetch().await });
        let (_, responder) = expect_request(&mut receiver).await.unwrap();

        assert!(client.snapshot().await.unwrap().is_loading);
        responder.send(cart_response(&[])).unwrap();
        assert!(!task.await.unwrap().unwrap().is_loading);
    }

    #[tokio::test]
    async fn out_of_order_responses_keep_newest_state() {
        let (client, mut receiver) = start(Some("tok"));

        let c = client.clone();
        let first = tokio::spawn(async move { c.add_item(CartKey::new("p1", None, "Red"), 1).await });
        let (_, first_responder) = expect_request(&mut receiver).await.unwrap();

        let c = client.clone();
        let second = tokio::spawn(async move { c.add_item(CartKey::new("p1", None, "Red"), 1).await });
        let (_, second_responder) = expect_request(&mut receiver).await.unwrap();

        second_responder.send(cart_response(&[("p1", "Red", 20.0, 2)])).unwrap();
        let after_second = second.await.unwrap().unwrap();
        assert_eq!(after_second.total_items(), 2);

        first_responder.send(cart_response(&[("p1", "Red", 20.0, 1)])).unwrap();
        let after_first = first.await.unwrap().unwrap();
        assert_eq!(after_first.total_items(), 2);
        assert_eq!(after_first.revision, after_second.revision);
    }

    #[tokio::test]
    async fn failure_leaves_cart_and_records_error() {
        let (client, mut receiver) = start(Some("tok"));

        let c = client.clone();
        let task = tokio::spawn(async move { c.fetch().await });
        let (_, responder) = expect_request(&mut receiver).await.unwrap();
        responder.send(cart_response(&[("p1", "Red", 20.0, 1)])).unwrap();
        task.await.unwrap().unwrap();

        let c = client.clone();
        let task = tokio::spawn(async move { c.remove_item(CartKey::new("p1", None, "Red")).await });
        let (_, responder) = expect_request(&mut receiver).await.unwrap();
        responder
            .send(Ok(crate::gateway::ApiResponse::new(
                503,
                serde_json::json!({ "message": "Cart service unavailable" }),
            )))
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Cart service unavailable");
        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.total_items(), 1);
        assert_eq!(snapshot.error.as_deref(), Some("Cart service unavailable"));
    }

    #[tokio::test]
    async fn unauthenticated_operation_fails_without_request() {
        let (client, mut receiver) = start(None);

        let err = client.clear().await.unwrap_err();

        assert_eq!(err, CartError::Api(ApiError::AuthRequired));
        assert!(receiver.try_recv().is_err());
        let snapshot = client.snapshot().await.unwrap();
        assert_eq!(snapshot.error.as_deref(), Some("Authentication required"));
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn reset_drops_response_of_earlier_request() {
        let (client, mut receiver) = start(Some("tok"));

        let c = client.clone();
        let task = tokio::spawn(async move { c.fetch().await });
        let (_, responder) = expect_request(&mut receiver).await.unwrap();

        client.reset().await.unwrap();
        responder.send(cart_response(&[("p1", "Red", 20.0, 5)])).unwrap();

        assert!(task.await.unwrap().unwrap().cart.is_empty());
        assert!(client.snapshot().await.unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn drawer_controls_do_not_touch_network() {
        let (client, mut receiver) = start(Some("tok"));
        assert!(client.toggle().await.unwrap());
        assert!(!client.close().await.unwrap());
        assert!(client.open().await.unwrap());
        assert!(client.snapshot().await.unwrap().is_open);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_stops_the_service() {
        let (transport, _receiver) = create_mock_transport(10);
        let gateway = CartGateway::new(transport, Session::default());
        let (service, client) = CartService::new(4, gateway);
        let handle = tokio::spawn(service.run());

        client.shutdown().await.unwrap();
        handle.await.unwrap();
        assert!(matches!(
            client.snapshot().await,
            Err(CartError::ActorCommunicationError(_))
        ));
    }
}
