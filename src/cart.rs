use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

/// One product held in a session cart. `name` and `unit_price_cents` are
/// snapshots taken when the product was first added; catalog edits made
/// afterwards do not touch them, and checkout charges exactly these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartEntry {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

/// A session cart, keyed by product id so each product appears at most once.
/// BTreeMap keeps iteration, and therefore order-line insertion, stable.
pub type Cart = BTreeMap<Uuid, CartEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartTotals {
    pub total_price_cents: i64,
    pub item_count: i64,
}

/// Sum of unit price x quantity across the cart, plus the unit count. Pure;
/// the mutation endpoints reject non-positive quantities before entries land
/// here.
pub fn totals(cart: &Cart) -> CartTotals {
    let mut total_price_cents = 0i64;
    let mut item_count = 0i64;
    for entry in cart.values() {
        total_price_cents += entry.unit_price_cents * i64::from(entry.quantity);
        item_count += i64::from(entry.quantity);
    }
    CartTotals {
        total_price_cents,
        item_count,
    }
}

/// In-process session-cart storage, keyed by user id. Handlers query and
/// clear carts through these explicit calls; no other code holds cart state.
#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cart for `key`; empty when the user has none.
    pub async fn snapshot(&self, key: Uuid) -> Cart {
        self.inner
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// Add `entry`, accumulating the quantity when the product is already in
    /// the cart. The name/price snapshot from the first add is kept either
    /// way. Returns the updated cart.
    pub async fn add(&self, key: Uuid, entry: CartEntry) -> Cart {
        let mut carts = self.inner.write().await;
        let cart = carts.entry(key).or_default();
        cart.entry(entry.product_id)
            .and_modify(|existing| existing.quantity += entry.quantity)
            .or_insert(entry);
        cart.clone()
    }

    /// Overwrite the quantity of an existing entry. `None` when the product
    /// is not in the cart.
    pub async fn set_quantity(&self, key: Uuid, product_id: Uuid, quantity: i32) -> Option<Cart> {
        let mut carts = self.inner.write().await;
        let cart = carts.get_mut(&key)?;
        let entry = cart.get_mut(&product_id)?;
        entry.quantity = quantity;
        Some(cart.clone())
    }

    /// Remove an entry. `None` when the product is not in the cart.
    pub async fn remove(&self, key: Uuid, product_id: Uuid) -> Option<Cart> {
        let mut carts = self.inner.write().await;
        let cart = carts.get_mut(&key)?;
        cart.remove(&product_id)?;
        Some(cart.clone())
    }

    /// Drop the whole cart. Checkout calls this once, strictly after commit.
    pub async fn clear(&self, key: Uuid) {
        self.inner.write().await.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(product_id: Uuid, price_cents: i64, quantity: i32) -> CartEntry {
        CartEntry {
            product_id,
            name: format!("product-{product_id}"),
            unit_price_cents: price_cents,
            quantity,
        }
    }

    #[test]
    fn totals_sum_unit_price_times_quantity() {
        let mut cart = Cart::new();
        let pancakes = Uuid::new_v4();
        let stew = Uuid::new_v4();
        cart.insert(pancakes, entry(pancakes, 899, 2));
        cart.insert(stew, entry(stew, 1450, 1));

        let totals = totals(&cart);
        assert_eq!(totals.total_price_cents, 3248);
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn totals_of_empty_cart_are_zero() {
        let totals = totals(&Cart::new());
        assert_eq!(totals.total_price_cents, 0);
        assert_eq!(totals.item_count, 0);
    }

    #[tokio::test]
    async fn add_accumulates_quantity_and_keeps_first_snapshot() {
        let store = CartStore::new();
        let user = Uuid::new_v4();
        let product = Uuid::new_v4();

        store.add(user, entry(product, 899, 2)).await;
        // Second add arrives with a different live price; the stored snapshot
        // must not move.
        let cart = store
            .add(
                user,
                CartEntry {
                    product_id: product,
                    name: "renamed".into(),
                    unit_price_cents: 999,
                    quantity: 1,
                },
            )
            .await;

        let held = &cart[&product];
        assert_eq!(held.quantity, 3);
        assert_eq!(held.unit_price_cents, 899);
        assert_eq!(held.name, format!("product-{product}"));
    }

    #[tokio::test]
    async fn set_quantity_requires_an_existing_entry() {
        let store = CartStore::new();
        let user = Uuid::new_v4();
        let product = Uuid::new_v4();

        assert!(store.set_quantity(user, product, 5).await.is_none());

        store.add(user, entry(product, 500, 1)).await;
        let cart = store.set_quantity(user, product, 5).await.unwrap();
        assert_eq!(cart[&product].quantity, 5);
    }

    #[tokio::test]
    async fn remove_requires_an_existing_entry() {
        let store = CartStore::new();
        let user = Uuid::new_v4();
        let product = Uuid::new_v4();

        assert!(store.remove(user, product).await.is_none());

        store.add(user, entry(product, 500, 1)).await;
        let cart = store.remove(user, product).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_cart() {
        let store = CartStore::new();
        let user = Uuid::new_v4();
        store.add(user, entry(Uuid::new_v4(), 500, 1)).await;

        store.clear(user).await;
        assert!(store.snapshot(user).await.is_empty());
    }

    #[tokio::test]
    async fn carts_are_isolated_per_user() {
        let store = CartStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.add(alice, entry(Uuid::new_v4(), 500, 1)).await;
        assert!(store.snapshot(bob).await.is_empty());
        assert_eq!(store.snapshot(alice).await.len(), 1);
    }
}
