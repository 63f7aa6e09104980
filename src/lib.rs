//! Client-side cart synchronization for a storefront backend.
//!
//! The server owns the cart. [`cart_actor::CartService`] mirrors it locally,
//! replacing its state wholesale with every server response, and
//! [`clients::CartClient`] is the handle UI code talks to.

pub mod domain;
pub mod error;
pub mod config;
pub mod session;
pub mod gateway;
pub mod messages;
pub mod clients;
pub mod cart_actor;
pub mod countdown;
pub mod app_system;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod fake_backend;
