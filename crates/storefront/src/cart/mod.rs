//! Cart state, mutations and rendering.

mod api;
mod events;
mod render;
mod store;

pub use api::CartApi;
pub use events::{CartEvents, CartUpdated, ChangeSource, Subscription};
pub use render::{
    CartItemView, CartPanelTemplate, CartRenderer, CartView, EmptyCartTemplate, RenderSettings,
};
pub use store::CartStore;
