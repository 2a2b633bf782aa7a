use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus, Store},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Convert the caller's session cart into a durable order.
///
/// The order header and every line are written inside one transaction, so a
/// reader never observes an order with a partial line set. The cart is charged
/// at the prices snapshotted when items were added, not at the current catalog
/// prices, and it is cleared only once the commit has succeeded; any failure
/// rolls everything back and leaves the cart intact for retry.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let cart = state.carts.snapshot(user.user_id).await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let store = match payload.store_id {
        Some(store_id) => {
            let store: Option<Store> = sqlx::query_as("SELECT * FROM stores WHERE id = $1")
                .bind(store_id)
                .fetch_optional(&state.pool)
                .await?;
            match store {
                Some(s) => Some(s),
                None => return Err(AppError::BadRequest("Unknown collection point".into())),
            }
        }
        None => None,
    };

    let totals = cart::totals(&cart);

    let mut tx = state.pool.begin().await?;

    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (id, user_id, store_id, total_price_cents, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.store_id)
    .bind(totals.total_price_cents)
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(&mut *tx)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(cart.len());
    for entry in cart.values() {
        let item: OrderItem = sqlx::query_as(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, price_at_purchase_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(entry.product_id)
        .bind(entry.quantity)
        .bind(entry.unit_price_cents)
        .fetch_one(&mut *tx)
        .await?;

        items.push(item);
    }

    tx.commit().await?;

    // Strictly after commit; a rollback above leaves the cart untouched.
    state.carts.clear(user.user_id).await;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "total_price_cents": order.total_price_cents,
            "lines": items.len(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order,
            items,
            store,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let status = parse_status_filter(query.status.as_deref())?;
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let sql = format!(
        r#"
        SELECT * FROM orders
        WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY created_at {}
        LIMIT $3 OFFSET $4
        "#,
        sort_order.as_sql()
    );
    let orders: Vec<Order> = sqlx::query_as(&sql)
        .bind(user.user_id)
        .bind(status.map(OrderStatus::as_str))
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)",
    )
    .bind(user.user_id)
    .bind(status.map(OrderStatus::as_str))
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Confirmation view: the caller's order with its lines and collection store.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = order_items(state, order.id).await?;
    let store = order_store(state, order.store_id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order,
            items,
            store,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) async fn order_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at, id")
            .bind(order_id)
            .fetch_all(&state.pool)
            .await?;
    Ok(items)
}

pub(crate) async fn order_store(
    state: &AppState,
    store_id: Option<Uuid>,
) -> AppResult<Option<Store>> {
    let store = match store_id {
        Some(id) => {
            sqlx::query_as("SELECT * FROM stores WHERE id = $1")
                .bind(id)
                .fetch_optional(&state.pool)
                .await?
        }
        None => None,
    };
    Ok(store)
}

pub(crate) fn parse_status_filter(raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match raw.filter(|s| !s.is_empty()) {
        Some(raw) => match OrderStatus::parse(raw) {
            Some(status) => Ok(Some(status)),
            None => Err(AppError::BadRequest(format!("Unknown status '{raw}'"))),
        },
        None => Ok(None),
    }
}
