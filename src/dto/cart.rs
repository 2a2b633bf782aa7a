use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::{self, Cart, CartEntry};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// Cart contents plus the running totals the storefront shows next to them.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub total_price_cents: i64,
    pub item_count: i64,
}

impl CartView {
    pub fn from_cart(cart: &Cart) -> Self {
        let totals = cart::totals(cart);
        Self {
            items: cart.values().cloned().collect(),
            total_price_cents: totals.total_price_cents,
            item_count: totals.item_count,
        }
    }
}
