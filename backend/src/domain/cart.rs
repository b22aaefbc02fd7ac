//! Session-held shopping cart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::invalid_field;
use crate::domain::{CURRENCY, Error, MAX_LINE_QTY, OrderLine, Product, UserId};

/// Most distinct products a cart may hold.
pub const MAX_CART_LINES: usize = 50;

/// One product and quantity in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub qty: i32,
}

/// Product ids and quantities, in insertion order.
///
/// The cart travels inside the session cookie, so it is stored in the
/// compact `<hex id>:<qty>,...` form produced by its `Display` impl and read
/// back through `FromStr`. A full cart stays well under the 4 KB cookie limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// A stored cart entry that could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed cart entry `{entry}`")]
pub struct CartDecodeError {
    entry: String,
}

fn check_qty(qty: i32, allow_zero: bool) -> Result<(), Error> {
    let min = if allow_zero { 0 } else { 1 };
    if qty < min || qty > MAX_LINE_QTY {
        return Err(invalid_field(
            "qty",
            "out_of_range",
            format!("qty must be between {min} and {MAX_LINE_QTY}"),
            Some(json!(qty)),
        ));
    }
    Ok(())
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `qty` units, merging with an existing line.
    pub fn add(&mut self, product_id: Uuid, qty: i32) -> Result<(), Error> {
        check_qty(qty, false)?;
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            let merged = line.qty.saturating_add(qty);
            check_qty(merged, false)?;
            line.qty = merged;
            return Ok(());
        }
        if self.lines.len() >= MAX_CART_LINES {
            return Err(invalid_field(
                "productId",
                "cart_full",
                format!("a cart holds at most {MAX_CART_LINES} products"),
                None,
            ));
        }
        self.lines.push(CartLine { product_id, qty });
        Ok(())
    }

    /// Replace the quantity of a line; zero removes it.
    pub fn set_qty(&mut self, product_id: Uuid, qty: i32) -> Result<(), Error> {
        check_qty(qty, true)?;
        if qty == 0 {
            self.remove(product_id);
            return Ok(());
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.qty = qty;
                Ok(())
            }
            None => Err(Error::not_found("product is not in the cart")),
        }
    }

    /// Drop a line. Missing lines are ignored.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Resolve lines against current product data.
    ///
    /// Lines whose product is missing or no longer visible are reported in
    /// `unavailable` rather than priced.
    pub fn resolve(&self, products: &[Product]) -> CartView {
        let mut view = CartView {
            currency: CURRENCY.to_owned(),
            ..CartView::default()
        };
        for line in &self.lines {
            match products
                .iter()
                .find(|p| p.id == line.product_id && p.is_visible())
            {
                Some(product) => {
                    let subtotal = product.price.saturating_mul(i64::from(line.qty));
                    view.total = view.total.saturating_add(subtotal);
                    view.lines.push(CartLineView {
                        product_id: product.id,
                        title: product.title.clone(),
                        seller_id: product.seller_id,
                        unit_price: product.price,
                        qty: line.qty,
                        subtotal,
                        stock_qty: product.stock_qty,
                    });
                }
                None => view.unavailable.push(*line),
            }
        }
        view
    }
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", line.product_id.simple(), line.qty)?;
        }
        Ok(())
    }
}

impl FromStr for Cart {
    type Err = CartDecodeError;

    /// Re-applies every line through [`Cart::add`], so a tampered or outdated
    /// value cannot exceed the cart limits.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut cart = Self::default();
        for entry in raw.split(',').filter(|entry| !entry.is_empty()) {
            let malformed = || CartDecodeError {
                entry: entry.to_owned(),
            };
            let (id, qty) = entry.split_once(':').ok_or_else(malformed)?;
            let product_id = Uuid::try_parse(id).map_err(|_| malformed())?;
            let qty = qty.parse::<i32>().map_err(|_| malformed())?;
            cart.add(product_id, qty).map_err(|_| malformed())?;
        }
        Ok(cart)
    }
}

/// Priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: Uuid,
    pub title: String,
    pub seller_id: UserId,
    pub unit_price: i64,
    pub qty: i32,
    pub subtotal: i64,
    pub stock_qty: i32,
}

/// Cart priced against current products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub unavailable: Vec<CartLine>,
    pub total: i64,
    pub currency: String,
}

impl CartView {
    /// Order lines grouped per seller, in first-seen order.
    pub fn group_by_seller(&self) -> Vec<(UserId, Vec<OrderLine>)> {
        let mut groups: Vec<(UserId, Vec<OrderLine>)> = Vec::new();
        for line in &self.lines {
            let order_line = OrderLine {
                product_id: line.product_id,
                qty: line.qty,
            };
            match groups.iter_mut().find(|(seller, _)| *seller == line.seller_id) {
                Some((_, lines)) => lines.push(order_line),
                None => groups.push((line.seller_id, vec![order_line])),
            }
        }
        groups
    }
}
