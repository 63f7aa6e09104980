//! In-memory stand-in for the storefront backend's cart and auth endpoints.
//!
//! Implements the server side of the cart contract (merge on identical
//! `(productId, size, color)`, server-side pricing, recomputed totals) so
//! client flows can be tested end to end without a network.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::domain::{Cart, CartItem, CartKey};
use crate::error::ApiError;
use crate::gateway::{ApiRequest, ApiResponse, Transport};

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    brand: String,
    price: f64,
}

#[derive(Default)]
pub struct FakeBackend {
    catalog: HashMap<String, CatalogEntry>,
    accounts: HashMap<String, (String, String)>,
    carts: Mutex<HashMap<String, Vec<CartItem>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, id: &str, name: &str, brand: &str, price: f64) -> Self {
        self.catalog.insert(
            id.to_string(),
            CatalogEntry {
                name: name.to_string(),
                brand: brand.to_string(),
                price,
            },
        );
        self
    }

    /// Registers `email`/`password`; a successful login returns `token`.
    pub fn with_account(mut self, email: &str, password: &str, token: &str) -> Self {
        self.accounts
            .insert(email.to_string(), (password.to_string(), token.to_string()));
        self
    }

    /// `"METHOD path"` for every request received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn route(&self, request: &ApiRequest) -> ApiResponse {
        match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/api/auth/login") => self.login(request),
            (method, path) if path.starts_with("/api/cart") => {
                let Some(token) = request.bearer.as_ref().filter(|t| self.knows_token(t)) else {
                    return error(401, "Not authorized, token failed");
                };
                let mut carts = self.carts.lock();
                let lines = carts.entry(token.clone()).or_default();
                match (method, path) {
                    ("GET", "/api/cart") => ok_cart(lines),
                    ("POST", "/api/cart/add") => self.add(lines, request),
                    ("PATCH", "/api/cart/update") => update(lines, request),
                    ("DELETE", "/api/cart/remove") => remove(lines, request),
                    ("DELETE", "/api/cart/clear") => {
                        lines.clear();
                        ok_cart(lines)
                    }
                    _ => error(404, "Route not found"),
                }
            }
            _ => error(404, "Route not found"),
        }
    }

    fn knows_token(&self, token: &str) -> bool {
        self.accounts.values().any(|(_, t)| t == token)
    }

    fn login(&self, request: &ApiRequest) -> ApiResponse {
        let body = request.body.clone().unwrap_or(Value::Null);
        let email = body["email"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();
        match self.accounts.get(email) {
            Some((expected, token)) if expected == password => ApiResponse::new(
                200,
                json!({
                    "success": true,
                    "token": token,
                    "user": { "_id": format!("user-{email}"), "name": email, "email": email }
                }),
            ),
            _ => error(401, "Invalid email or password"),
        }
    }

    fn add(&self, lines: &mut Vec<CartItem>, request: &ApiRequest) -> ApiResponse {
        let Some((key, quantity)) = parse_line(request) else {
            return error(400, "Invalid cart item");
        };
        let Some(entry) = self.catalog.get(&key.product_id) else {
            return error(404, "Product not found");
        };
        let quantity = quantity.unwrap_or(1);
        match lines.iter().position(|line| line.matches(&key)) {
            Some(position) => lines[position].quantity += quantity,
            None => lines.push(CartItem {
                product_id: key.product_id,
                name: entry.name.clone(),
                brand: entry.brand.clone(),
                price: entry.price,
                image: String::new(),
                size: key.size,
                color: key.color,
                quantity,
            }),
        }
        ok_cart(lines)
    }
}

fn update(lines: &mut Vec<CartItem>, request: &ApiRequest) -> ApiResponse {
    let Some((key, Some(quantity))) = parse_line(request) else {
        return error(400, "Invalid cart item");
    };
    let Some(position) = lines.iter().position(|line| line.matches(&key)) else {
        return error(404, "Item not found in cart");
    };
    if quantity == 0 {
        lines.remove(position);
    } else {
        lines[position].quantity = quantity;
    }
    ok_cart(lines)
}

fn remove(lines: &mut Vec<CartItem>, request: &ApiRequest) -> ApiResponse {
    let Some((key, _)) = parse_line(request) else {
        return error(400, "Invalid cart item");
    };
    lines.retain(|line| !line.matches(&key));
    ok_cart(lines)
}

fn parse_line(request: &ApiRequest) -> Option<(CartKey, Option<u32>)> {
    let body = request.body.as_ref()?;
    let key: CartKey = serde_json::from_value(body.clone()).ok()?;
    let quantity = body
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok());
    Some((key, quantity))
}

fn ok_cart(lines: &[CartItem]) -> ApiResponse {
    let cart = Cart {
        items: lines.to_vec(),
        total_items: lines.iter().map(|line| line.quantity).sum(),
        total_price: lines.iter().map(CartItem::line_total).sum(),
    };
    ApiResponse::new(200, json!({ "success": true, "cart": cart }))
}

fn error(status: u16, message: &str) -> ApiResponse {
    ApiResponse::new(status, json!({ "success": false, "message": message }))
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests
            .lock()
            .push(format!("{} {}", request.method, request.path));
        Ok(self.route(&request))
    }
}
