//! Integration tests for Store action broadcasting
//!
//! Observers see every action produced by effects, which is how UI bindings
//! wait for the outcome of a network round trip.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use storefront_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use storefront_runtime::{Store, StoreError};

#[derive(Debug, Clone, PartialEq)]
enum CheckoutAction {
    /// Begin checkout for an order
    Begin { order: u64 },
    /// One checkout step finished
    StepFinished { order: u64, step: u32 },
    /// Checkout finished (terminal action)
    Confirmed { order: u64 },
    /// Checkout failed (terminal action)
    Rejected { order: u64, reason: String },
    /// Bump a counter and echo the new value
    Touch,
    /// Echo of `Touch`
    Touched { value: u32 },
}

#[derive(Debug, Clone, Default)]
struct CheckoutState {
    touches: u32,
    steps: Vec<(u64, u32)>,
}

#[derive(Clone)]
struct CheckoutEnvironment;

#[derive(Clone)]
struct CheckoutReducer;

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::Begin { order } => {
                if order == 0 {
                    return smallvec![Effect::future(async move {
                        Some(CheckoutAction::Rejected {
                            order,
                            reason: "empty order".to_string(),
                        })
                    })];
                }
                smallvec![Effect::future(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(CheckoutAction::StepFinished { order, step: 1 })
                })]
            }
            CheckoutAction::StepFinished { order, step } => {
                state.steps.push((order, step));
                if step < 3 {
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(CheckoutAction::StepFinished { order, step: step + 1 })
                    })]
                } else {
                    smallvec![Effect::future(async move {
                        Some(CheckoutAction::Confirmed { order })
                    })]
                }
            }
            CheckoutAction::Touch => {
                state.touches += 1;
                let value = state.touches;
                smallvec![Effect::future(async move {
                    Some(CheckoutAction::Touched { value })
                })]
            }
            CheckoutAction::Confirmed { .. }
            | CheckoutAction::Rejected { .. }
            | CheckoutAction::Touched { .. } => SmallVec::new(),
        }
    }
}

fn checkout_store() -> Store<CheckoutState, CheckoutAction, CheckoutEnvironment, CheckoutReducer> {
    Store::new(CheckoutState::default(), CheckoutReducer, CheckoutEnvironment)
}

#[tokio::test]
async fn test_send_and_wait_for_immediate() {
    let store = checkout_store();

    let result = store
        .send_and_wait_for(
            CheckoutAction::Touch,
            |action| matches!(action, CheckoutAction::Touched { .. }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result.unwrap(), CheckoutAction::Touched { value: 1 });
}

#[tokio::test]
async fn test_send_and_wait_for_multi_step_flow() {
    let store = checkout_store();

    let result = store
        .send_and_wait_for(
            CheckoutAction::Begin { order: 42 },
            |action| matches!(action, CheckoutAction::Confirmed { order: 42 }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result.unwrap(), CheckoutAction::Confirmed { order: 42 });
    let steps = store.state(|s| s.steps.clone()).await;
    assert_eq!(steps, vec![(42, 1), (42, 2), (42, 3)]);
}

#[tokio::test]
async fn test_rejection_is_broadcast() {
    let store = checkout_store();

    let result = store
        .send_and_wait_for(
            CheckoutAction::Begin { order: 0 },
            |action| {
                matches!(
                    action,
                    CheckoutAction::Confirmed { .. } | CheckoutAction::Rejected { .. }
                )
            },
            Duration::from_secs(1),
        )
        .await;

    assert!(matches!(
        result.unwrap(),
        CheckoutAction::Rejected { order: 0, .. }
    ));
}

#[tokio::test]
async fn test_wait_for_action_that_never_arrives() {
    let store = checkout_store();

    let result = store
        .send_and_wait_for(
            CheckoutAction::Begin { order: 7 },
            |action| matches!(action, CheckoutAction::Rejected { order: 7, .. }),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result.unwrap_err(), StoreError::Timeout));
}

#[tokio::test]
async fn test_concurrent_flows_are_correlated() {
    let store = Arc::new(checkout_store());
    let mut handles = vec![];

    for order in 1..=5 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    CheckoutAction::Begin { order },
                    move |action| matches!(action, CheckoutAction::Confirmed { order: o } if *o == order),
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for (idx, handle) in handles.into_iter().enumerate() {
        let order = idx as u64 + 1;
        assert_eq!(
            handle.await.unwrap().unwrap(),
            CheckoutAction::Confirmed { order }
        );
    }

    let steps = store.state(|s| s.steps.len()).await;
    assert_eq!(steps, 15);
}

#[tokio::test]
async fn test_initial_actions_not_broadcast() {
    let store = checkout_store();
    let mut rx = store.subscribe_actions();

    let _ = store.send(CheckoutAction::Touch).await.unwrap();

    // Only the effect's echo is observed, never the `Touch` itself.
    let observed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(observed, CheckoutAction::Touched { value: 1 });
}
