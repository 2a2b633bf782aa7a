use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{CategoryList, ProductDetail, ProductList, ProductSummary, StoreAvailability},
    error::{AppError, AppResult},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Filter by product name"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let (page, limit, offset) = query.pagination.normalize();
    let like = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));
    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);

    let sql = format!(
        r#"
        SELECT p.id, p.category_id, p.name, p.description, p.price_cents, p.image_url, p.created_at,
               c.name AS category_name
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE ($1::UUID IS NULL OR p.category_id = $1)
          AND ($2::TEXT IS NULL OR p.name ILIKE $2)
        ORDER BY {} {}
        LIMIT $3 OFFSET $4
        "#,
        sort_by.as_sql(),
        sort_order.as_sql()
    );
    let items: Vec<ProductSummary> = sqlx::query_as(&sql)
        .bind(query.category_id)
        .bind(like.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM products
        WHERE ($1::UUID IS NULL OR category_id = $1)
          AND ($2::TEXT IS NULL OR name ILIKE $2)
        "#,
    )
    .bind(query.category_id)
    .bind(like.as_deref())
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    let data = ProductList { items };
    Ok(Json(ApiResponse::success("Products", data, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with per-store availability", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let product: Option<ProductSummary> = sqlx::query_as(
        r#"
        SELECT p.id, p.category_id, p.name, p.description, p.price_cents, p.image_url, p.created_at,
               c.name AS category_name
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let availability: Vec<StoreAvailability> = sqlx::query_as(
        r#"
        SELECT s.id AS store_id, s.name AS store_name, s.location_code,
               COALESCE(i.quantity, 0) AS quantity
        FROM stores s
        LEFT JOIN inventory i ON i.store_id = s.id AND i.product_id = $1
        ORDER BY s.location_code ASC, s.name ASC
        "#,
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            availability,
        },
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items: Vec<Category> = sqlx::query_as("SELECT * FROM categories ORDER BY name ASC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    )))
}
