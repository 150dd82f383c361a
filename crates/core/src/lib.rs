//! AYMODINES Core - Cart domain types.
//!
//! This crate provides the types shared by every part of the cart:
//! - `storefront` - The in-page cart module (storage, rendering, dispatch)
//! - `integration-tests` - End-to-end cart scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no storage access, no rendering. Everything that touches the page or the
//! browser storage lives in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Type-safe ids, prices, cart lines and the cart collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
