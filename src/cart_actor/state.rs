use crate::domain::{Cart, CartSnapshot};

/// Local mirror of the server cart plus request bookkeeping.
///
/// The cart only ever changes by wholesale replacement with a server
/// response, and only when that response is newer than the one last applied.
#[derive(Debug, Default)]
pub struct CartState {
    cart: Cart,
    is_open: bool,
    in_flight: usize,
    error: Option<String>,
    next_seq: u64,
    applied_seq: u64,
}

impl CartState {
    /// Registers a new operation and returns its sequence number.
    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.in_flight += 1;
        self.error = None;
        self.next_seq
    }

    /// Applies `cart` if `seq` is newer than the last applied response.
    /// Returns whether it was applied.
    pub fn apply(&mut self, seq: u64, cart: Cart) -> bool {
        self.finish();
        if seq <= self.applied_seq {
            return false;
        }
        self.cart = cart;
        self.applied_seq = seq;
        true
    }

    /// Records a failure unless a newer response already superseded `seq`.
    /// The cart is left untouched either way.
    pub fn fail(&mut self, seq: u64, message: String) -> bool {
        self.finish();
        if seq <= self.applied_seq {
            return false;
        }
        self.error = Some(message);
        true
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Empties the cart and marks every issued operation as superseded.
    pub fn reset(&mut self) {
        self.cart = Cart::default();
        self.error = None;
        self.is_open = false;
        self.applied_seq = self.next_seq;
    }

    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    pub fn set_open(&mut self, open: bool) -> bool {
        self.is_open = open;
        self.is_open
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart: self.cart.clone(),
            is_open: self.is_open,
            is_loading: self.is_loading(),
            error: self.error.clone(),
            revision: self.applied_seq,
        }
    }
}
