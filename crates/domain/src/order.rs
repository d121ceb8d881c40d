//! The order being transacted and the user who placed it.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Money;

/// The user placing an order.
///
/// Opaque identity: the orchestrator never inspects it beyond logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    city: String,
}

impl User {
    /// Creates a new user. The name must not be empty.
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyUserName);
        }
        Ok(Self {
            name,
            city: city.into(),
        })
    }

    /// Returns the user's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the user's city.
    pub fn city(&self) -> &str {
        &self.city
    }
}

/// An order placement request.
///
/// Created once per placement and immutable afterwards. The commander
/// instance processing it owns it exclusively until a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user: User,
    item: String,
    price: Money,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order with a fresh ID.
    pub fn new(user: User, item: impl Into<String>, price: Money) -> Result<Self, DomainError> {
        let item = item.into();
        if item.trim().is_empty() {
            return Err(DomainError::EmptyItem);
        }
        Ok(Self {
            id: OrderId::new(),
            user,
            item,
            price,
            created_at: Utc::now(),
        })
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the user who placed the order.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns the ordered item.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Returns the order price.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new("Jim", "ABCD").unwrap()
    }

    #[test]
    fn test_user_requires_name() {
        assert!(matches!(
            User::new("", "ABCD"),
            Err(DomainError::EmptyUserName)
        ));
        assert!(matches!(
            User::new("   ", "ABCD"),
            Err(DomainError::EmptyUserName)
        ));
    }

    #[test]
    fn test_user_city_may_be_empty() {
        let user = User::new("Jim", "").unwrap();
        assert_eq!(user.name(), "Jim");
        assert_eq!(user.city(), "");
    }

    #[test]
    fn test_order_requires_item() {
        assert!(matches!(
            Order::new(sample_user(), "", Money::from_dollars(10)),
            Err(DomainError::EmptyItem)
        ));
    }

    #[test]
    fn test_orders_get_unique_ids() {
        let o1 = Order::new(sample_user(), "book", Money::from_dollars(10)).unwrap();
        let o2 = Order::new(sample_user(), "book", Money::from_dollars(10)).unwrap();
        assert_ne!(o1.id(), o2.id());
    }

    #[test]
    fn test_order_serialization_roundtrip() {
        let order = Order::new(sample_user(), "book", Money::from_dollars(10)).unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
