use std::fmt;

use serde::{Deserialize, Serialize};

use super::{null_as_default, opt_string_or_number, pick_id};

/// Identity of a cart line. Two lines with the same product but a different
/// size or color are different lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartKey {
    pub product_id: String,
    pub size: Option<String>,
    pub color: String,
}

impl CartKey {
    pub fn new(product_id: impl Into<String>, size: Option<&str>, color: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            size: size.map(str::to_string),
            color: color.into(),
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size {
            Some(size) => write!(f, "{}/{}/{}", self.product_id, size, self.color),
            None => write!(f, "{}/-/{}", self.product_id, self.color),
        }
    }
}

/// A line in the cart, as priced by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCartItem")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub image: String,
    pub size: Option<String>,
    pub color: String,
    pub quantity: u32,
}

/// Product reference inside a server line: a plain id or a populated product.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductRef {
    Id(String),
    Populated {
        #[serde(default)]
        id: Option<String>,
        #[serde(default, rename = "_id")]
        mongo_id: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCartItem {
    #[serde(default)]
    product_id: Option<ProductRef>,
    #[serde(default)]
    product: Option<ProductRef>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    image: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    size: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    quantity: u32,
}

impl TryFrom<RawCartItem> for CartItem {
    type Error = String;

    fn try_from(raw: RawCartItem) -> Result<Self, Self::Error> {
        let referenced = raw.product_id.or(raw.product).and_then(|r| match r {
            ProductRef::Id(id) => Some(id),
            ProductRef::Populated { id, mongo_id } => pick_id(id, mongo_id),
        });
        let product_id = referenced
            .or_else(|| pick_id(raw.id, raw.mongo_id))
            .ok_or("cart item without a product id")?;

        Ok(Self {
            product_id,
            name: raw.name,
            brand: raw.brand,
            price: raw.price,
            image: raw.image,
            size: raw.size,
            color: raw.color,
            quantity: raw.quantity,
        })
    }
}

impl CartItem {
    pub fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    pub fn matches(&self, key: &CartKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// The server-authoritative cart. Totals are taken from the server as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CartItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_items: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_price: f64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, key: &CartKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    pub fn quantity_sum(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn price_sum(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the server totals agree with the lines (prices to the cent).
    pub fn totals_consistent(&self) -> bool {
        self.total_items == self.quantity_sum()
            && (self.total_price - self.price_sum()).abs() < 0.005
    }
}

/// What UI consumers read: the cart plus drawer and request status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub cart: Cart,
    pub is_open: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Sequence number of the last server response applied to the cart.
    pub revision: u64,
}

impl CartSnapshot {
    pub fn total_items(&self) -> u32 {
        self.cart.total_items
    }

    pub fn total_price(&self) -> f64 {
        self.cart.total_price
    }
}
