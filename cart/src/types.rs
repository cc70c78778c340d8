//! Cart domain types.
//!
//! [`CartState`] owns the line items and keeps the totals derived from them.
//! Every mutation goes through a method that recomputes the totals, so the
//! totals can never drift from the items.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(u64);

impl ProductId {
    /// Creates a new `ProductId`
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn effective(unit_price: f64, discount_percentage: Option<f64>) -> f64 {
    discount_percentage.map_or(unit_price, |discount| {
        unit_price * (1.0 - discount.clamp(0.0, 100.0) / 100.0)
    })
}

/// A product as offered to the cart, without a quantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product identifier
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Price per unit before discount
    pub unit_price: f64,
    /// Discount in percent (0 to 100)
    pub discount_percentage: Option<f64>,
    /// Thumbnail URL
    pub thumbnail: String,
    /// Units available
    pub stock: u32,
    /// Brand name
    pub brand: Option<String>,
}

impl CartProduct {
    /// Creates a product with no discount, thumbnail or brand
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, unit_price: f64, stock: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit_price,
            discount_percentage: None,
            thumbnail: String::new(),
            stock,
            brand: None,
        }
    }

    /// Sets the discount percentage
    #[must_use]
    pub fn with_discount(mut self, percentage: f64) -> Self {
        self.discount_percentage = Some(percentage);
        self
    }

    /// Sets the thumbnail URL
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    /// Sets the brand
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Unit price after discount
    #[must_use]
    pub fn effective_price(&self) -> f64 {
        effective(self.unit_price, self.discount_percentage)
    }
}

/// One product in the cart
///
/// `1 <= quantity <= stock` always holds for an item held by [`CartState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product identifier
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Price per unit before discount
    pub unit_price: f64,
    /// Discount in percent (0 to 100)
    pub discount_percentage: Option<f64>,
    /// Thumbnail URL
    pub thumbnail: String,
    /// Units in the cart
    pub quantity: u32,
    /// Units available
    pub stock: u32,
    /// Brand name
    pub brand: Option<String>,
}

impl CartLineItem {
    fn from_product(product: CartProduct, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            unit_price: product.unit_price,
            discount_percentage: product.discount_percentage,
            thumbnail: product.thumbnail,
            quantity,
            stock: product.stock,
            brand: product.brand,
        }
    }

    /// Unit price after discount
    #[must_use]
    pub fn effective_price(&self) -> f64 {
        effective(self.unit_price, self.discount_percentage)
    }

    /// Effective price times quantity
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.effective_price() * f64::from(self.quantity)
    }
}

/// Shopping cart contents
///
/// Items keep insertion order and are unique by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CartState {
    items: Vec<CartLineItem>,
    total_items: u32,
    total_price: f64,
}

impl CartState {
    /// An empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in insertion order
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of all quantities
    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Sum of all line totals
    #[must_use]
    pub const fn total_price(&self) -> f64 {
        self.total_price
    }

    /// Whether the cart holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line item for `id`
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Quantity of `id`, or 0 when absent
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.quantity)
    }

    /// Whether `id` is in the cart
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Line total of `id`, or 0 when absent
    #[must_use]
    pub fn line_total(&self, id: ProductId) -> f64 {
        self.get(id).map_or(0.0, CartLineItem::line_total)
    }

    /// Add one unit of `product`, never exceeding its stock
    ///
    /// An item already in the cart keeps its stored details. Returns the
    /// resulting quantity, which is 0 when the product has no stock.
    pub fn add_item(&mut self, product: CartProduct) -> u32 {
        let quantity = if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            if item.quantity >= item.stock {
                tracing::trace!(product_id = %item.id, stock = item.stock, "Quantity capped at stock");
            }
            item.quantity = item.quantity.saturating_add(1).min(item.stock);
            item.quantity
        } else {
            let quantity = product.stock.min(1);
            if quantity == 0 {
                tracing::trace!(product_id = %product.id, "Out of stock product not added");
            } else {
                self.items.push(CartLineItem::from_product(product, quantity));
            }
            quantity
        };

        self.recompute();
        quantity
    }

    /// Remove `id`; returns whether it was present
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        self.recompute();
        removed
    }

    /// Replace the quantity of `id`, clamped to `[0, stock]`
    ///
    /// A resulting quantity of 0 removes the item. Returns the resulting
    /// quantity, or `None` when `id` is not in the cart.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;

        let clamped = quantity.clamp(0, i64::from(item.stock));
        if clamped != quantity {
            tracing::trace!(product_id = %id, requested = quantity, clamped, "Quantity clamped");
        }
        item.quantity = u32::try_from(clamped).unwrap_or(item.stock);
        let result = item.quantity;

        if result == 0 {
            self.items.retain(|item| item.id != id);
        }
        self.recompute();
        Some(result)
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|item| item.quantity).sum();
        self.total_price = self.items.iter().map(CartLineItem::line_total).sum();
    }
}
