//! Core types for the cart.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod cart;
pub mod id;
pub mod item;
pub mod price;

pub use cart::{Cart, CartError, CartInvariantError, LineChange};
pub use id::*;
pub use item::{CartItem, NewItem};
pub use price::Price;
