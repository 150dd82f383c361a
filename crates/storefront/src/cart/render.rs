//! Cart rendering.
//!
//! The renderer redraws two regions straight from storage: the unit-count
//! badge and the cart panel. The panel is replaced wholesale on every render;
//! there is no incremental patching.

use std::sync::Arc;

use askama::Template;
use aymodines_core::{Cart, CartItem};
use tracing::instrument;

use super::store::CartStore;
use crate::config::CartConfig;
use crate::document::{Document, regions};
use crate::error::Result;

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub image_url: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Build the view for `cart`.
    #[must_use]
    pub fn new(cart: &Cart, settings: &RenderSettings) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, settings))
                .collect(),
            subtotal: cart.subtotal().display(&settings.currency_prefix),
            item_count: cart.item_count(),
        }
    }

    /// Whether there is nothing to list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CartItemView {
    fn new(item: &CartItem, settings: &RenderSettings) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            price: item.price.display(&settings.currency_prefix),
            quantity: item.quantity,
            image_url: item
                .image
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(&settings.placeholder_image)
                .to_string(),
        }
    }
}

/// Presentation settings the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub currency_prefix: String,
    pub placeholder_image: String,
    pub checkout_url: String,
}

impl From<&CartConfig> for RenderSettings {
    fn from(config: &CartConfig) -> Self {
        Self {
            currency_prefix: config.currency_prefix.clone(),
            placeholder_image: config.placeholder_image.clone(),
            checkout_url: config.checkout_url.clone(),
        }
    }
}

/// Cart panel with lines, subtotal and checkout link.
#[derive(Template)]
#[template(path = "cart/panel.html")]
pub struct CartPanelTemplate<'a> {
    pub heading: &'a str,
    pub cart: &'a CartView,
    pub placeholder_image: &'a str,
    pub checkout_url: &'a str,
}

/// Cart panel for an empty cart.
#[derive(Template)]
#[template(path = "cart/empty.html")]
pub struct EmptyCartTemplate<'a> {
    pub heading: &'a str,
}

const PANEL_HEADING: &str = "Your Cart";

/// Redraws the badge and panel from the stored cart.
#[derive(Clone)]
pub struct CartRenderer {
    store: CartStore,
    document: Arc<dyn Document>,
    settings: Arc<RenderSettings>,
}

impl std::fmt::Debug for CartRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartRenderer")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CartRenderer {
    /// Create a renderer drawing `store` into `document`.
    pub fn new(store: CartStore, document: Arc<dyn Document>, settings: RenderSettings) -> Self {
        Self {
            store,
            document,
            settings: Arc::new(settings),
        }
    }

    /// Redraw the badge and the panel, whichever are on the page.
    ///
    /// Safe to call any number of times. A template failure is logged and
    /// leaves the panel as it was.
    #[instrument(skip(self))]
    pub fn render(&self) {
        let cart = self.store.load();
        let view = CartView::new(&cart, &self.settings);

        if let Some(badge) = self.document.element_by_id(regions::CART_BADGE) {
            self.document.set_text(badge, &view.item_count.to_string());
        }

        let Some(panel) = self.document.element_by_id(regions::CART_PANEL) else {
            return;
        };

        match self.panel_html(&view) {
            Ok(html) => self.document.set_inner_html(panel, &html),
            Err(e) => tracing::error!(error = %e, "Failed to render cart panel"),
        }
    }

    /// Markup for the panel region.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Template` if the template fails to render.
    pub fn panel_html(&self, view: &CartView) -> Result<String> {
        if view.is_empty() {
            return Ok(EmptyCartTemplate {
                heading: PANEL_HEADING,
            }
            .render()?);
        }

        Ok(CartPanelTemplate {
            heading: PANEL_HEADING,
            cart: view,
            placeholder_image: &self.settings.placeholder_image,
            checkout_url: &self.settings.checkout_url,
        }
        .render()?)
    }
}
