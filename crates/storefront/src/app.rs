//! Page-level wiring.
//!
//! `CartApp` is what a host embeds: it owns the store, the change bus, the
//! renderer and the dispatcher for one page, and turns page lifecycle events
//! into calls on them.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::cart::{
    CartApi, CartEvents, CartRenderer, CartStore, CartUpdated, ChangeSource, RenderSettings,
    Subscription,
};
use crate::config::CartConfig;
use crate::dispatch::{Action, ClickEvent, DispatchSettings, Dispatcher};
use crate::document::Document;
use crate::error::Result;
use crate::shell::ShellInjector;
use crate::storage::KeyValueStorage;

/// The cart for one page.
///
/// This struct is cheaply cloneable via `Arc`; clones drive the same page.
#[derive(Clone)]
pub struct CartApp {
    inner: Arc<CartAppInner>,
}

struct CartAppInner {
    config: CartConfig,
    store: CartStore,
    api: CartApi,
    renderer: CartRenderer,
    shell: ShellInjector,
    dispatcher: Dispatcher,
    // Keeps the renderer subscribed for as long as the app lives.
    _render_on_change: Subscription,
}

impl std::fmt::Debug for CartApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApp")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .field("dispatcher", &self.inner.dispatcher)
            .finish_non_exhaustive()
    }
}

impl CartApp {
    /// Wire up a page.
    ///
    /// The renderer is subscribed to the change bus straight away, so every
    /// cart write from here on redraws the badge and panel.
    pub fn new(
        config: CartConfig,
        storage: Arc<dyn KeyValueStorage>,
        document: Arc<dyn Document>,
    ) -> Self {
        let events = CartEvents::new();
        let store = CartStore::new(storage, config.storage_key.as_str(), events.clone());
        let api = CartApi::new(store.clone());
        let renderer = CartRenderer::new(
            store.clone(),
            Arc::clone(&document),
            RenderSettings::from(&config),
        );
        let shell = ShellInjector::new(Arc::clone(&document), config.site.clone());
        let dispatcher = Dispatcher::new(
            api.clone(),
            shell.clone(),
            document,
            DispatchSettings::from(&config),
        );

        let listener = renderer.clone();
        let render_on_change = events.subscribe(move |_: &CartUpdated| listener.render());

        Self {
            inner: Arc::new(CartAppInner {
                config,
                store,
                api,
                renderer,
                shell,
                dispatcher,
                _render_on_change: render_on_change,
            }),
        }
    }

    /// Wire up a page with configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an environment variable is invalid.
    pub fn from_env(
        storage: Arc<dyn KeyValueStorage>,
        document: Arc<dyn Document>,
    ) -> Result<Self> {
        let config = CartConfig::from_env()?;
        Ok(Self::new(config, storage, document))
    }

    /// The page finished loading: inject the shell, then draw the cart into
    /// it.
    #[instrument(skip(self))]
    pub fn on_page_ready(&self) {
        self.inner.shell.inject();
        self.inner.renderer.render();
    }

    /// Handle a click anywhere on the page. Returns the actions that fired.
    pub fn on_click(&self, event: &ClickEvent) -> Vec<Action> {
        self.inner.dispatcher.dispatch(event)
    }

    /// Another page on the same origin wrote `key`.
    ///
    /// `None` means the whole store was cleared. Writes to unrelated keys are
    /// ignored. Returns whether the page was notified.
    #[instrument(skip(self))]
    pub fn on_storage_changed(&self, key: Option<&str>) -> bool {
        if key.is_some_and(|key| key != self.inner.store.key()) {
            return false;
        }
        self.inner.store.events().publish(CartUpdated {
            source: ChangeSource::External,
        });
        true
    }

    /// Advance the page clock, applying any deferred effects now due.
    pub fn advance_timers(&self, elapsed: Duration) -> usize {
        self.inner.dispatcher.advance_timers(elapsed)
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn store(&self) -> &CartStore {
        &self.inner.store
    }

    /// Get a reference to the cart mutation API.
    #[must_use]
    pub fn api(&self) -> &CartApi {
        &self.inner.api
    }

    /// Get a reference to the change bus.
    #[must_use]
    pub fn events(&self) -> &CartEvents {
        self.inner.store.events()
    }

    /// Get a reference to the renderer.
    #[must_use]
    pub fn renderer(&self) -> &CartRenderer {
        &self.inner.renderer
    }

    /// Get a reference to the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aymodines_core::{ItemId, NewItem, Price};

    use crate::dispatch::EventNode;
    use crate::document::{MemoryDocument, regions};
    use crate::storage::MemoryStorage;

    fn page() -> (Arc<MemoryStorage>, Arc<MemoryDocument>, CartApp) {
        let storage = Arc::new(MemoryStorage::new());
        let document = Arc::new(MemoryDocument::new());
        document.create_element(Some(regions::HEADER_PLACEHOLDER), &[]);
        let modal = document.create_element(Some(regions::CART_MODAL), &["invisible", "opacity-0"]);
        document.append_child(modal, Some(regions::CART_PANEL), &["translate-x-full"]);
        document.create_element(Some(regions::FOOTER_PLACEHOLDER), &[]);

        let app = CartApp::new(CartConfig::default(), storage.clone(), document.clone());
        (storage, document, app)
    }

    fn rice() -> NewItem {
        NewItem::new(ItemId::new(1), "Rice", Price::from_minor(550))
    }

    #[test]
    fn test_page_ready_draws_shell_and_cart() {
        let (_, document, app) = page();
        app.on_page_ready();

        assert_eq!(document.text_of(regions::CART_BADGE).as_deref(), Some("0"));
        let html = document.html_of(regions::CART_PANEL).unwrap();
        assert!(html.contains("Your cart is empty."));
    }

    #[test]
    fn test_mutation_rerenders() {
        let (_, document, app) = page();
        app.on_page_ready();

        app.api().add_item(rice()).unwrap();
        assert_eq!(document.text_of(regions::CART_BADGE).as_deref(), Some("1"));
        assert!(document.html_of(regions::CART_PANEL).unwrap().contains("RM 5.50"));
    }

    #[test]
    fn test_external_write_rerenders() {
        let (storage, document, app) = page();
        app.on_page_ready();

        storage
            .set(
                "cart",
                r#"[{"id": 4, "name": "Satay", "price": 12, "quantity": 3}]"#,
            )
            .unwrap();
        assert_eq!(document.text_of(regions::CART_BADGE).as_deref(), Some("0"));

        assert!(app.on_storage_changed(Some("cart")));
        assert_eq!(document.text_of(regions::CART_BADGE).as_deref(), Some("3"));
        assert!(document.html_of(regions::CART_PANEL).unwrap().contains("RM 36.00"));
    }

    #[test]
    fn test_unrelated_storage_key_is_ignored() {
        let (_, _, app) = page();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = app
            .events()
            .subscribe(move |event: &CartUpdated| sink.lock().push(event.source));

        assert!(!app.on_storage_changed(Some("theme")));
        assert!(app.on_storage_changed(None));
        assert_eq!(*seen.lock(), vec![ChangeSource::External]);
    }

    #[test]
    fn test_click_opens_cart() {
        let (_, document, app) = page();
        app.on_page_ready();

        let fired = app.on_click(&ClickEvent::on(EventNode::new().with_action(Action::OpenCart)));
        assert_eq!(fired, vec![Action::OpenCart]);
        let modal = document.element_by_id(regions::CART_MODAL).unwrap();
        assert!(!document.has_class(modal, "invisible"));
    }

    #[test]
    fn test_dropping_app_unsubscribes_renderer() {
        let (_, _, app) = page();
        let events = app.events().clone();
        assert_eq!(events.listener_count(), 1);

        let clone = app.clone();
        drop(app);
        assert_eq!(events.listener_count(), 1);
        drop(clone);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_custom_storage_key() {
        let storage = Arc::new(MemoryStorage::new());
        let document = Arc::new(MemoryDocument::new());
        let config = CartConfig {
            storage_key: "aymodines-cart".to_string(),
            ..CartConfig::default()
        };
        let app = CartApp::new(config, storage.clone(), document);

        app.api().add_item(rice()).unwrap();
        assert!(storage.get("aymodines-cart").unwrap().is_some());
        assert!(storage.get("cart").unwrap().is_none());
    }
}
