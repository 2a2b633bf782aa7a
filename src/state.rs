use crate::{cart::CartStore, db::DbPool};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub carts: CartStore,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            carts: CartStore::new(),
        }
    }
}
