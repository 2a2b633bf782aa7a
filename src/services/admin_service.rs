use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        orders::{AdminOrderList, AdminOrderRow, OrderWithItems},
        products::InventoryLevel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, Product},
    response::{ApiResponse, Meta},
    routes::admin::{
        CreateProductRequest, SetInventoryRequest, UpdateOrderStatusRequest, UpdateProductRequest,
    },
    routes::params::{OrderListQuery, SortOrder},
    services::order_service,
    state::AppState,
};

/// Dashboard listing: every order joined with its customer and collection
/// store, filterable by status, newest first by default.
pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<AdminOrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();
    let status = order_service::parse_status_filter(query.status.as_deref())?;
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let sql = format!(
        r#"
        SELECT o.id, o.user_id, o.store_id, o.total_price_cents, o.status, o.created_at,
               u.name AS customer_name, u.email AS customer_email,
               s.name AS store_name, s.location_code
        FROM orders o
        JOIN users u ON u.id = o.user_id
        LEFT JOIN stores s ON s.id = o.store_id
        WHERE ($1::TEXT IS NULL OR o.status = $1)
        ORDER BY o.created_at {}
        LIMIT $2 OFFSET $3
        "#,
        sort_order.as_sql()
    );
    let rows: Vec<AdminOrderRow> = sqlx::query_as(&sql)
        .bind(status.map(OrderStatus::as_str))
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::TEXT IS NULL OR status = $1)")
            .bind(status.map(OrderStatus::as_str))
            .fetch_one(&state.pool)
            .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Orders",
        AdminOrderList { items: rows },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = order_service::order_items(state, order.id).await?;
    let store = order_service::order_store(state, order.store_id).await?;

    Ok(ApiResponse::success(
        "Order found",
        OrderWithItems {
            order,
            items,
            store,
        },
        Some(Meta::empty()),
    ))
}

/// Move an order through its lifecycle. Unknown status values and transitions
/// outside the fixed table are both explicit 400s, not silent no-ops.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let next = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{}'", payload.status)))?;

    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::parse(&order.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "order {} has unrecognized status '{}'",
            order.id,
            order.status
        ))
    })?;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot move order from '{current}' to '{next}'"
        )));
    }

    let updated: Order = sqlx::query_as("UPDATE orders SET status = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(next.as_str())
        .fetch_one(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": updated.id, "status": updated.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        updated,
        Some(Meta::empty()),
    ))
}

/// Upsert the stock level of one product at one collection point.
pub async fn set_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: SetInventoryRequest,
) -> AppResult<ApiResponse<InventoryLevel>> {
    ensure_admin(user)?;
    if payload.quantity < 0 {
        return Err(AppError::BadRequest("quantity must not be negative".into()));
    }

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".into()));
    }
    let store_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stores WHERE id = $1")
        .bind(payload.store_id)
        .fetch_optional(&state.pool)
        .await?;
    if store_exist.is_none() {
        return Err(AppError::BadRequest("store not found".into()));
    }

    let level: InventoryLevel = sqlx::query_as(
        r#"
        INSERT INTO inventory (product_id, store_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (product_id, store_id) DO UPDATE SET quantity = EXCLUDED.quantity
        RETURNING product_id, store_id, quantity
        "#,
    )
    .bind(payload.product_id)
    .bind(payload.store_id)
    .bind(payload.quantity)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "inventory_set",
        Some("inventory"),
        Some(serde_json::json!({
            "product_id": level.product_id,
            "store_id": level.store_id,
            "quantity": level.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Inventory updated",
        level,
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.price_cents < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    let category_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
        .bind(payload.category_id)
        .fetch_optional(&state.pool)
        .await?;
    if category_exist.is_none() {
        return Err(AppError::BadRequest("category not found".into()));
    }

    let product: Product = sqlx::query_as(
        r#"
        INSERT INTO products (id, category_id, name, description, price_cents, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.category_id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price_cents)
    .bind(payload.image_url)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let name = payload.name.unwrap_or(existing.name);
    let description = payload.description.or(existing.description);
    let price_cents = payload.price_cents.unwrap_or(existing.price_cents);
    let image_url = payload.image_url.or(existing.image_url);

    if price_cents < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let product: Product = sqlx::query_as(
        r#"
        UPDATE products
        SET category_id = $2, name = $3, description = $4, price_cents = $5, image_url = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(name)
    .bind(description)
    .bind(price_cents)
    .bind(image_url)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Updated",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
