use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Category;

/// Catalog row: product plus its category name.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub category_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductSummary>,
}

/// Stock on hand at one collection point.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct StoreAvailability {
    pub store_id: Uuid,
    pub store_name: String,
    pub location_code: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductSummary,
    pub availability: Vec<StoreAvailability>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct InventoryLevel {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
}
