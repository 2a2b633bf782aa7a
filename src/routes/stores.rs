use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::stores::StoreList,
    error::AppResult,
    models::Store,
    response::ApiResponse,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_stores))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    responses(
        (status = 200, description = "List collection points", body = ApiResponse<StoreList>)
    ),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    let items: Vec<Store> = sqlx::query_as("SELECT * FROM stores ORDER BY name ASC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success("Stores", StoreList { items }, None)))
}
