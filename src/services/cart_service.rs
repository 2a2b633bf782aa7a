use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::CartEntry,
    dto::cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let cart = state.carts.snapshot(user.user_id).await;
    Ok(ApiResponse::success("OK", CartView::from_cart(&cart), None))
}

/// Add a product to the session cart. The product's name and current price
/// are copied into the entry here; checkout later charges this snapshot even
/// if the catalog price moves in between. Adding the same product again only
/// bumps the quantity.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product: Option<(String, i64)> =
        sqlx::query_as("SELECT name, price_cents FROM products WHERE id = $1")
            .bind(payload.product_id)
            .fetch_optional(&state.pool)
            .await?;
    let Some((name, price_cents)) = product else {
        return Err(AppError::BadRequest("product not found".to_string()));
    };

    let cart = state
        .carts
        .add(
            user.user_id,
            CartEntry {
                product_id: payload.product_id,
                name,
                unit_price_cents: price_cents,
                quantity: payload.quantity,
            },
        )
        .await;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart"),
        Some(serde_json::json!({
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to cart",
        CartView::from_cart(&cart),
        None,
    ))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let cart = state
        .carts
        .set_quantity(user.user_id, product_id, payload.quantity)
        .await
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart"),
        Some(serde_json::json!({
            "product_id": product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart updated",
        CartView::from_cart(&cart),
        None,
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state
        .carts
        .remove(user.user_id, product_id)
        .await
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        CartView::from_cart(&cart),
        None,
    ))
}
