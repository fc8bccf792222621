//! Reducer-driven state containers.
//!
//! The middleware only talks to stores through the [`Store`] and
//! [`StoreFactory`] traits, so any state container can be plugged in.
//! [`ReducerStore`] is the built-in implementation.

mod contract;
mod store;

pub use contract::{
    identity_reducer, listener, reducer, Listener, Reducer, StateChange, Store, StoreFactory,
    Unsubscribe,
};
pub use store::{ReducerStore, ReducerStoreFactory};
