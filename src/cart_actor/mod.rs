//! The cart store: one actor owning the local mirror of the server cart.

mod service;
mod state;

pub use service::CartService;
pub use state::CartState;
