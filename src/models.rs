use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// Collection point for click & collect orders.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub location_code: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Order header. `store_id` NULL means home delivery. `total_price_cents` is
/// fixed at placement time and never re-derived from the lines.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Option<Uuid>,
    pub total_price_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One product line of an order. Immutable after creation;
/// `price_at_purchase_cents` is the unit price snapshotted at checkout so
/// later catalog price changes never alter historical orders.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Order lifecycle. Every transition is admin-triggered; there are no
/// automatic transitions and no timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    ReadyForPickup,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Unknown values are rejected outright rather than silently ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(OrderStatus::Pending),
            "ready_for_pickup" => Some(OrderStatus::ReadyForPickup),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, ReadyForPickup | Completed | Cancelled)
                | (ReadyForPickup, Completed | Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::{self, *};

    #[test]
    fn parse_roundtrips_every_status() {
        for status in [Pending, ReadyForPickup, Completed, Cancelled] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("PENDING"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn pending_can_move_anywhere_forward() {
        assert!(Pending.can_transition_to(ReadyForPickup));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn ready_for_pickup_can_only_finish() {
        assert!(ReadyForPickup.can_transition_to(Completed));
        assert!(ReadyForPickup.can_transition_to(Cancelled));
        assert!(!ReadyForPickup.can_transition_to(Pending));
        assert!(!ReadyForPickup.can_transition_to(ReadyForPickup));
    }

    #[test]
    fn terminal_states_stay_terminal() {
        for next in [Pending, ReadyForPickup, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }
}
