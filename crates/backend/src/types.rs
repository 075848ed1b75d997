//! Wire envelopes for backend requests and responses.
//!
//! Domain entities (products, users, orders) live in `loomwear-core`; the
//! types here only describe the request bodies and wrappers specific to
//! individual endpoints.

use loomwear_core::cart::CartLine;
use loomwear_core::catalog::Product;
use loomwear_core::types::price::decimal_number;
use loomwear_core::{OrderStatus, ProductId, UserId, UserRole};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response to a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub role: UserRole,
}

/// Body of error responses and of most mutation responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/cart/cart/{userId}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartEnvelope {
    #[serde(default)]
    pub cart: ServerCart,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerCart {
    #[serde(default)]
    pub items: Vec<ServerCartItem>,
}

/// A cart line as persisted by the backend, with its product populated.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerCartItem {
    /// `None` when the product has since been deleted.
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

impl ServerCartItem {
    /// Convert to a local cart line. Lines whose product is gone are dropped.
    #[must_use]
    pub fn into_line(self) -> Option<CartLine> {
        let product = self.product?;
        Some(CartLine::from_product(
            &product,
            self.size,
            self.color,
            self.quantity,
        ))
    }
}

impl CartEnvelope {
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.cart
            .items
            .into_iter()
            .filter_map(ServerCartItem::into_line)
            .collect()
    }
}

/// `POST /api/cart/add-to-cart` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub items: Vec<AddToCartItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddToCartItem {
    pub id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub image: Option<String>,
    pub title: String,
    #[serde(with = "decimal_number")]
    pub price: Decimal,
    pub stock: u32,
}

impl AddToCartRequest {
    #[must_use]
    pub fn for_line(user_id: UserId, line: &CartLine) -> Self {
        Self {
            user_id,
            product_id: line.product_id.clone(),
            items: vec![AddToCartItem {
                id: line.product_id.clone(),
                size: line.size.clone(),
                color: line.color.clone(),
                quantity: line.quantity,
                image: line.image.clone(),
                title: line.name.clone(),
                price: line.price,
                stock: line.stock,
            }],
        }
    }
}

/// `POST /api/cart/cart/remove-item` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartItemRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// `POST /api/cart/cart/update-item` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `PATCH /api/order/update-status/{id}` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /api/product/image-upload` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// An image file forwarded to the upload endpoint.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_envelope_drops_deleted_products() {
        let json = r#"{
            "cart": {
                "items": [
                    {"product": {"_id": "p1", "name": "Tee", "price": 499, "stock": 4, "images": ["a.jpg"]}, "quantity": 2, "size": "M", "color": "Red"},
                    {"product": null, "quantity": 1, "size": "L", "color": "Blue"}
                ]
            }
        }"#;
        let envelope: CartEnvelope = serde_json::from_str(json).unwrap();
        let lines = envelope.into_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Tee");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].image.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_add_to_cart_request_shape() {
        let line = CartLine {
            product_id: ProductId::new("p1"),
            name: "Tee".to_string(),
            image: Some("a.jpg".to_string()),
            price: Decimal::new(499, 0),
            stock: 4,
            size: "M".to_string(),
            color: "Red".to_string(),
            quantity: 1,
        };
        let json = serde_json::to_value(AddToCartRequest::for_line(UserId::new("u1"), &line)).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["items"][0]["title"], "Tee");
        assert_eq!(json["items"][0]["price"], 499.0);
    }

    #[test]
    fn test_login_response_accepts_either_id_field() {
        let a: LoginResponse = serde_json::from_str(r#"{"id": "u1", "role": "admin"}"#).unwrap();
        let b: LoginResponse = serde_json::from_str(r#"{"_id": "u2"}"#).unwrap();
        assert!(a.role.is_admin());
        assert_eq!(b.id.as_str(), "u2");
        assert!(!b.role.is_admin());
    }
}
