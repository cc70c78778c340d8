//! Cart reducer.

use crate::types::{CartProduct, CartState, ProductId};
use storefront_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Commands accepted by the cart
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    /// Add one unit of a product
    AddItem(CartProduct),
    /// Remove a product entirely
    RemoveItem(ProductId),
    /// Replace a product's quantity
    SetQuantity {
        /// Product to change
        id: ProductId,
        /// Requested quantity; zero or less removes the item
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

/// Dependencies of the cart reducer
///
/// The cart performs no I/O, so it has none.
#[derive(Clone, Copy, Debug, Default)]
pub struct CartEnvironment;

/// Applies [`CartAction`]s to [`CartState`]
///
/// Clamping is silent: over-stock adds and out-of-range quantities are
/// corrected, never rejected. The reducer returns no effects.
#[derive(Clone, Copy, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CartAction::AddItem(product) => {
                let id = product.id;
                let quantity = state.add_item(product);
                tracing::debug!(
                    product_id = %id,
                    quantity,
                    total_items = state.total_items(),
                    total_price = state.total_price(),
                    "Item added"
                );
            },
            CartAction::RemoveItem(id) => {
                let removed = state.remove_item(id);
                tracing::debug!(
                    product_id = %id,
                    removed,
                    total_items = state.total_items(),
                    total_price = state.total_price(),
                    "Item removed"
                );
            },
            CartAction::SetQuantity { id, quantity } => {
                let result = state.set_quantity(id, quantity);
                tracing::debug!(
                    product_id = %id,
                    requested = quantity,
                    quantity = ?result,
                    total_items = state.total_items(),
                    total_price = state.total_price(),
                    "Quantity set"
                );
            },
            CartAction::Clear => {
                state.clear();
                tracing::debug!("Cart cleared");
            },
        }

        SmallVec::new()
    }
}
