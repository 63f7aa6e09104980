#[macro_use]
mod macros;

mod cart_client;

pub use cart_client::CartClient;
