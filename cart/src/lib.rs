//! # Storefront Cart
//!
//! In-memory shopping cart: line items with quantities bounded by stock,
//! and totals that are always recomputed from the items.
//!
//! The cart is a [`CartReducer`] run by the generic
//! [`Store`](storefront_runtime::Store). [`Cart`] is the handle consumers
//! hold; clones address the same cart. There is no global instance.
//!
//! # Example Usage
//!
//! ```no_run
//! use storefront_cart::{Cart, CartProduct, ProductId};
//!
//! # async fn example() -> Result<(), storefront_runtime::StoreError> {
//! let cart = Cart::new();
//! let lamp = CartProduct::new(7, "Lamp", 100.0, 10).with_discount(25.0);
//!
//! cart.add_item(lamp.clone()).await?;
//! cart.add_item(lamp).await?;
//!
//! assert_eq!(cart.quantity_of(ProductId::new(7)).await, 2);
//! assert_eq!(cart.snapshot().await.total_price(), 150.0);
//! # Ok(())
//! # }
//! ```

pub mod reducer;
pub mod types;

pub use reducer::{CartAction, CartEnvironment, CartReducer};
pub use types::{CartLineItem, CartProduct, CartState, ProductId};

use std::time::Duration;
use storefront_runtime::{Store, StoreError};
use tokio::sync::watch;

type CartStore = Store<CartState, CartAction, CartEnvironment, CartReducer>;

/// Shared handle to one cart
///
/// Mutations are applied atomically, in the order they are sent.
#[derive(Clone)]
pub struct Cart {
    store: CartStore,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// An empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(CartState::default())
    }

    /// A cart starting from `state`
    #[must_use]
    pub fn with_state(state: CartState) -> Self {
        Self {
            store: Store::new(state, CartReducer::new(), CartEnvironment),
        }
    }

    async fn dispatch(&self, action: CartAction) -> Result<(), StoreError> {
        self.store.send(action).await.map(|_| ())
    }

    /// Add one unit of `product`, capped at its stock
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is shut down.
    pub async fn add_item(&self, product: CartProduct) -> Result<(), StoreError> {
        self.dispatch(CartAction::AddItem(product)).await
    }

    /// Remove `id` if present
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is shut down.
    pub async fn remove_item(&self, id: ProductId) -> Result<(), StoreError> {
        self.dispatch(CartAction::RemoveItem(id)).await
    }

    /// Replace the quantity of `id`; zero or less removes it
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is shut down.
    pub async fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<(), StoreError> {
        self.dispatch(CartAction::SetQuantity { id, quantity }).await
    }

    /// Empty the cart
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once the cart is shut down.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.dispatch(CartAction::Clear).await
    }

    /// Quantity of `id`, or 0
    pub async fn quantity_of(&self, id: ProductId) -> u32 {
        self.store.state(|state| state.quantity_of(id)).await
    }

    /// Whether `id` is in the cart
    pub async fn contains(&self, id: ProductId) -> bool {
        self.store.state(|state| state.contains(id)).await
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> CartState {
        self.store.state(Clone::clone).await
    }

    /// Stop accepting mutations
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if pending work outlives `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    /// Notified after every mutation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe_changes()
    }
}
