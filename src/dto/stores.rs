use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Store;

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub items: Vec<Store>,
}
