//! Typed access to the storefront REST API.
//!
//! Every gateway goes through a [`Transport`], so the wire can be swapped for
//! a scripted mock or an in-memory backend in tests.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod http;
pub mod settings;
pub mod transport;

pub use auth::AuthGateway;
pub use cart::{CartGateway, CartOperation};
pub use catalog::CatalogGateway;
pub use http::HttpTransport;
pub use settings::SettingsGateway;
pub use transport::{ApiRequest, ApiResponse, Transport};

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Percent-encodes `raw` for use as a single path segment.
pub(crate) fn path_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

/// The server's `message` field, or `fallback` when there is none.
pub(crate) fn server_message(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Turns a non-2xx response into [`ApiError::Request`] and hands back the body otherwise.
pub(crate) fn expect_success(response: ApiResponse, fallback: &str) -> Result<Value, ApiError> {
    if response.is_success() {
        Ok(response.body)
    } else {
        Err(ApiError::request(
            response.status,
            server_message(&response.body, fallback),
        ))
    }
}

/// Decodes the first of `fields` present in `body`, or `body` itself when
/// `fields` is empty or none match and `allow_bare` is set.
pub(crate) fn decode_field<T: DeserializeOwned>(
    body: &Value,
    fields: &[&str],
    allow_bare: bool,
) -> Result<T, ApiError> {
    let wrapped = fields
        .iter()
        .find_map(|field| body.get(*field).filter(|value| !value.is_null()));
    let value = match wrapped {
        Some(value) => value,
        None if allow_bare => body,
        None => {
            return Err(ApiError::Decode(format!(
                "missing `{}` in response",
                fields.join("` or `")
            )))
        }
    };
    serde_json::from_value(value.clone()).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_segment_escapes_separators() {
        assert_eq!(path_segment("p1"), "p1");
        assert_eq!(path_segment("a/b?c=1#d"), "a%2Fb%3Fc%3D1%23d");
    }

    #[test]
    fn server_message_falls_back_when_absent_or_empty() {
        assert_eq!(server_message(&json!({ "message": "Out of stock" }), "x"), "Out of stock");
        assert_eq!(server_message(&json!({ "message": "" }), "Failed"), "Failed");
        assert_eq!(server_message(&Value::Null, "Failed"), "Failed");
    }

    #[test]
    fn expect_success_maps_status_and_message() {
        let err = expect_success(
            ApiResponse::new(409, json!({ "message": "Size unavailable" })),
            "Failed to add to cart",
        )
        .unwrap_err();
        assert_eq!(err, ApiError::request(409, "Size unavailable"));
    }

    #[test]
    fn decode_field_requires_wrapper_unless_bare_allowed() {
        let body = json!({ "value": 3 });
        let n: u32 = decode_field(&body, &["value"], false).unwrap();
        assert_eq!(n, 3);
        assert!(matches!(
            decode_field::<u32>(&body, &["cart"], false),
            Err(ApiError::Decode(_))
        ));
        let bare: u32 = decode_field(&json!(7), &["value"], true).unwrap();
        assert_eq!(bare, 7);
    }
}
