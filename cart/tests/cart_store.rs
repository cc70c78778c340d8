//! Cart handle driven through the store runtime.

#![allow(clippy::unwrap_used)]

use std::time::Duration;
use storefront_cart::{Cart, CartProduct, ProductId};
use storefront_runtime::StoreError;

fn mascara() -> CartProduct {
    CartProduct::new(1, "Essence Mascara Lash Princess", 9.99, 3)
        .with_thumbnail("https://cdn.dummyjson.com/products/images/beauty/thumbnail.png")
        .with_brand("Essence")
}

fn lamp() -> CartProduct {
    CartProduct::new(7, "Lamp", 100.0, 10).with_discount(25.0)
}

#[tokio::test]
async fn four_adds_with_stock_three_keep_three() {
    let cart = Cart::new();
    for _ in 0..4 {
        cart.add_item(mascara()).await.unwrap();
    }

    assert_eq!(cart.quantity_of(ProductId::new(1)).await, 3);
    assert_eq!(cart.snapshot().await.total_items(), 3);
}

#[tokio::test]
async fn discounted_item_contributes_effective_price() {
    let cart = Cart::new();
    cart.add_item(lamp()).await.unwrap();
    cart.add_item(lamp()).await.unwrap();

    let snapshot = cart.snapshot().await;
    assert!((snapshot.total_price() - 150.0).abs() < 1e-9);
}

#[tokio::test]
async fn all_six_operations() {
    let cart = Cart::new();
    cart.add_item(mascara()).await.unwrap();
    cart.add_item(lamp()).await.unwrap();
    assert!(cart.contains(ProductId::new(1)).await);

    cart.set_quantity(ProductId::new(7), 4).await.unwrap();
    assert_eq!(cart.quantity_of(ProductId::new(7)).await, 4);

    cart.remove_item(ProductId::new(1)).await.unwrap();
    assert!(!cart.contains(ProductId::new(1)).await);
    assert_eq!(cart.quantity_of(ProductId::new(1)).await, 0);

    cart.set_quantity(ProductId::new(7), 0).await.unwrap();
    assert!(cart.snapshot().await.is_empty());

    cart.add_item(lamp()).await.unwrap();
    cart.clear().await.unwrap();
    assert_eq!(cart.snapshot().await, storefront_cart::CartState::default());
}

#[tokio::test]
async fn clones_share_one_cart() {
    let cart = Cart::new();
    let other = cart.clone();

    other.add_item(lamp()).await.unwrap();
    assert_eq!(cart.quantity_of(ProductId::new(7)).await, 1);
}

#[tokio::test]
async fn concurrent_adds_are_atomic() {
    let cart = Cart::new();
    let product = CartProduct::new(5, "Table", 299.99, 50);

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let cart = cart.clone();
            let product = product.clone();
            tokio::spawn(async move { cart.add_item(product).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let snapshot = cart.snapshot().await;
    assert_eq!(snapshot.quantity_of(ProductId::new(5)), 20);
    assert_eq!(snapshot.total_items(), 20);
}

#[tokio::test]
async fn subscribers_see_every_mutation() {
    let cart = Cart::new();
    let mut changes = cart.subscribe();
    let start = *changes.borrow_and_update();

    cart.add_item(mascara()).await.unwrap();
    cart.remove_item(ProductId::new(1)).await.unwrap();

    changes.changed().await.unwrap();
    assert_eq!(*changes.borrow(), start + 2);
}

#[tokio::test]
async fn shut_down_cart_rejects_mutations() {
    let cart = Cart::new();
    cart.add_item(lamp()).await.unwrap();

    cart.shutdown(Duration::from_secs(1)).await.unwrap();
    let error = cart.add_item(lamp()).await.unwrap_err();

    assert!(matches!(error, StoreError::ShutdownInProgress));
    assert_eq!(cart.quantity_of(ProductId::new(7)).await, 1);
}
