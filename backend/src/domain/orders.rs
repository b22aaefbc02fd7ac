//! Marketplace orders and their fulfilment lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::{invalid_field, optional_text};
use crate::domain::{Error, Product, UserId};

/// Largest quantity accepted on a single order line.
pub const MAX_LINE_QTY: i32 = 1000;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Packed,
    Dispatched,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Packed => "packed",
            Self::Dispatched => "dispatched",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "packed" => Some(Self::Packed),
            "dispatched" => Some(Self::Dispatched),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Position along the fulfilment path. `Cancelled` is off the path.
    fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Packed => Some(2),
            Self::Dispatched => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Whether the order may still be cancelled.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Statuses whose totals count as platform revenue.
    pub fn counts_as_revenue(self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Packed | Self::Dispatched | Self::Delivered
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the buyer receives the goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOption {
    Pickup,
    Delivery,
}

impl DeliveryOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "PICKUP",
            Self::Delivery => "DELIVERY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PICKUP" => Some(Self::Pickup),
            "DELIVERY" => Some(Self::Delivery),
            _ => None,
        }
    }
}

/// Requested quantity of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    pub qty: i32,
}

/// Priced line stored with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub qty: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// A buyer's order from a single seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_price: i64,
    pub delivery_option: DeliveryOption,
    pub delivery_district: Option<String>,
    pub delivery_address: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated order placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub delivery_option: DeliveryOption,
    pub delivery_district: Option<String>,
    pub delivery_address: Option<String>,
}

/// Which orders a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Buyer(UserId),
    Seller(UserId),
    All,
}

/// Stock shortfall reported by the order repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub product_id: Uuid,
    pub available: i32,
    pub requested: i32,
}

impl StockShortfall {
    /// Conflict error carrying the shortfall as details.
    pub fn into_error(self) -> Error {
        Error::conflict("insufficient stock for the requested quantity").with_details(json!({
            "productId": self.product_id,
            "available": self.available,
            "requested": self.requested,
        }))
    }
}

/// Merge duplicate product lines and check quantities.
pub fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, Error> {
    if lines.is_empty() {
        return Err(invalid_field(
            "items",
            "required",
            "an order needs at least one item",
            None,
        ));
    }
    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.qty < 1 {
            return Err(invalid_field(
                "items.qty",
                "out_of_range",
                "qty must be at least 1",
                Some(json!(line.qty)),
            ));
        }
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.qty = existing.qty.saturating_add(line.qty),
            None => merged.push(*line),
        }
    }
    if let Some(line) = merged.iter().find(|l| l.qty > MAX_LINE_QTY) {
        return Err(invalid_field(
            "items.qty",
            "out_of_range",
            format!("qty must not exceed {MAX_LINE_QTY}"),
            Some(json!(line.qty)),
        ));
    }
    Ok(merged)
}

impl Order {
    /// Price `lines` against `products` and build a pending order.
    ///
    /// `products` must hold every product referenced by `lines`. All of them
    /// must be visible and belong to one seller other than the buyer.
    pub fn draft(
        buyer_id: UserId,
        request: &OrderRequest,
        lines: &[OrderLine],
        products: &[Product],
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let delivery_district =
            optional_text("deliveryDistrict", request.delivery_district.as_deref(), 100)?;
        let delivery_address =
            optional_text("deliveryAddress", request.delivery_address.as_deref(), 300)?;
        if request.delivery_option == DeliveryOption::Delivery && delivery_address.is_none() {
            return Err(invalid_field(
                "deliveryAddress",
                "required",
                "deliveryAddress is required for DELIVERY orders",
                None,
            ));
        }

        let mut seller_id = None;
        let mut items = Vec::with_capacity(lines.len());
        let mut total: i64 = 0;
        for line in lines {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id && p.is_visible())
                .ok_or_else(|| {
                    invalid_field(
                        "items.productId",
                        "unavailable",
                        "product is not available",
                        Some(json!(line.product_id)),
                    )
                })?;
            match seller_id {
                None => seller_id = Some(product.seller_id),
                Some(seller) if seller != product.seller_id => {
                    return Err(invalid_field(
                        "items",
                        "mixed_sellers",
                        "all items in an order must come from the same seller",
                        None,
                    ));
                }
                Some(_) => {}
            }
            if product.seller_id == buyer_id {
                return Err(invalid_field(
                    "items.productId",
                    "own_product",
                    "you cannot order your own product",
                    Some(json!(product.id)),
                ));
            }
            let subtotal = product
                .price
                .checked_mul(i64::from(line.qty))
                .ok_or_else(|| Error::invalid_request("order total is too large"))?;
            total = total
                .checked_add(subtotal)
                .ok_or_else(|| Error::invalid_request("order total is too large"))?;
            items.push(OrderItem {
                product_id: product.id,
                product_name: product.title.clone(),
                qty: line.qty,
                unit_price: product.price,
                subtotal,
            });
        }
        let seller_id =
            seller_id.ok_or_else(|| invalid_field("items", "required", "no items", None))?;

        Ok(Self {
            id: Uuid::new_v4(),
            buyer_id,
            seller_id,
            items,
            total_price: total,
            delivery_option: request.delivery_option,
            delivery_district,
            delivery_address,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `user` is the buyer or the seller.
    pub fn involves(&self, user: UserId) -> bool {
        self.buyer_id == user || self.seller_id == user
    }

    /// Move forward along the fulfilment path. Skipping ahead is allowed.
    pub fn advance(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<(), Error> {
        let forward = match (self.status.rank(), next.rank()) {
            (Some(current), Some(target)) => target > current,
            _ => false,
        };
        if !forward {
            return Err(Error::conflict(format!(
                "order cannot move from {} to {}",
                self.status, next
            ))
            .with_details(json!({ "from": self.status, "to": next })));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Cancel a pending or confirmed order.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.status.is_cancellable() {
            return Err(Error::conflict(format!(
                "a {} order can no longer be cancelled",
                self.status
            )));
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }
}
