use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, Store};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Collection point for click & collect; omit for home delivery.
    pub store_id: Option<Uuid>,
}

/// Order header with its lines and, for click & collect, the chosen store.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub store: Option<Store>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Dashboard row: order joined with the customer and collection store.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct AdminOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Option<Uuid>,
    pub total_price_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub store_name: Option<String>,
    pub location_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderList {
    pub items: Vec<AdminOrderRow>,
}
