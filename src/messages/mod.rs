use tokio::sync::oneshot;

use crate::domain::{Cart, CartSnapshot};
use crate::error::{ApiError, CartError};
use crate::gateway::CartOperation;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Messages understood by [`crate::cart_actor::CartService`]. Each variant
/// carries its parameters and a oneshot channel for the response.
#[derive(Debug)]
pub enum CartRequest {
    /// Run a gateway operation and apply the server cart it returns.
    Sync {
        operation: CartOperation,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    /// Sent by the service to itself when a dispatched operation resolves.
    Completed {
        seq: u64,
        result: Result<Cart, ApiError>,
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    Snapshot {
        respond_to: ServiceResponse<CartSnapshot, CartError>,
    },
    Toggle {
        respond_to: ServiceResponse<bool, CartError>,
    },
    SetOpen {
        open: bool,
        respond_to: ServiceResponse<bool, CartError>,
    },
    /// Empty the local cart, e.g. on logout. In-flight responses are discarded.
    Reset {
        respond_to: ServiceResponse<(), CartError>,
    },
    Shutdown,
}
