use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::domain::{CartKey, CartSnapshot};
use crate::error::CartError;
use crate::gateway::CartOperation;
use crate::messages::CartRequest;

/// Handle to the [`crate::cart_actor::CartService`]. Cheap to clone; every
/// UI consumer (drawer, navbar badge, product card) can hold its own.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    pub async fn fetch(&self) -> Result<CartSnapshot, CartError> {
        self.sync(CartOperation::Fetch).await
    }

    pub async fn add_item(&self, key: CartKey, quantity: u32) -> Result<CartSnapshot, CartError> {
        self.sync(CartOperation::Add { key, quantity }).await
    }

    pub async fn update_quantity(
        &self,
        key: CartKey,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        self.sync(CartOperation::UpdateQuantity { key, quantity }).await
    }

    pub async fn remove_item(&self, key: CartKey) -> Result<CartSnapshot, CartError> {
        self.sync(CartOperation::Remove { key }).await
    }

    pub async fn clear(&self) -> Result<CartSnapshot, CartError> {
        self.sync(CartOperation::Clear).await
    }

    pub async fn open(&self) -> Result<bool, CartError> {
        self.set_open(true).await
    }

    pub async fn close(&self) -> Result<bool, CartError> {
        self.set_open(false).await
    }

    /// Manual method for special cases (no response needed)
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|e| CartError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(CartClient => fn sync(operation: CartOperation) -> CartSnapshot as CartRequest::Sync, Error = CartError);
client_method!(CartClient => fn snapshot() -> CartSnapshot as CartRequest::Snapshot, Error = CartError);
client_method!(CartClient => fn toggle() -> bool as CartRequest::Toggle, Error = CartError);
client_method!(CartClient => fn set_open(open: bool) -> bool as CartRequest::SetOpen, Error = CartError);
client_method!(CartClient => fn reset() -> () as CartRequest::Reset, Error = CartError);
