//! Order domain model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditInfo;
use crate::error::PetstoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Placed,
    Approved,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Approved => "approved",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = PetstoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placed" => Ok(OrderStatus::Placed),
            "approved" => Ok(OrderStatus::Approved),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(PetstoreError::invalid(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    /// Weak reference; resolved through the pet repository at request time.
    pub pet_id: Uuid,
    pub quantity: Option<i64>,
    pub ship_date: Option<String>,
    pub status: OrderStatus,
    pub complete: bool,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Fields required to record a new order against a known pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub pet_id: Uuid,
    pub quantity: Option<i64>,
    pub ship_date: Option<String>,
    pub status: Option<OrderStatus>,
    pub complete: Option<bool>,
}

/// Fields that can be updated on an existing order.
///
/// Updates are not re-validated against pet availability.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub pet_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub ship_date: Option<String>,
    pub status: Option<OrderStatus>,
    pub complete: Option<bool>,
}
