//! AYMODINES storefront cart.
//!
//! The in-page cart for the restaurant site: a cart persisted in local
//! key-value storage, the cart panel and badge rendered from it, the shared
//! header and footer, and the click handling that ties them together. Hosts
//! embed a [`CartApp`] and feed it page events.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod cart;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod filters;
pub mod shell;
pub mod storage;
pub mod telemetry;
pub mod timers;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::CartApp;
pub use config::CartConfig;
pub use error::{AppError, Result};
