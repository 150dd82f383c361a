//! Click dispatch.
//!
//! One delegated handler sees every click on the page. Interactive elements
//! carry a `data-action` tag (plus `data-id` / `data-item` where the action
//! needs them); the dispatcher looks each tag up in a fixed table and runs
//! the matching handler. Every table entry is checked on every click, so a
//! click can fire more than one action if the markup tags it that way.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use aymodines_core::{ItemId, NewItem};
use parking_lot::Mutex;
use tracing::instrument;

use crate::cart::CartApi;
use crate::config::CartConfig;
use crate::document::{Document, NodeRef, regions};
use crate::error::PayloadError;
use crate::shell::ShellInjector;
use crate::timers::{DeferredEffect, TimerQueue};

/// `data-*` key holding an item id.
pub const ITEM_ID_KEY: &str = "id";
/// `data-*` key holding a serialized menu item.
pub const ITEM_PAYLOAD_KEY: &str = "item";

/// Label shown on an add-to-cart control right after its payload is read.
pub const ADDED_LABEL: &str = "Added!";
/// Resting label of an add-to-cart control.
pub const ADD_LABEL: &str = "Add to Cart";

/// Which elements on the click path an action matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// Only the element that was clicked.
    Target,
    /// The clicked element or its nearest tagged ancestor.
    Closest,
}

/// Everything a click can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    OpenCart,
    CloseCart,
    DismissBackdrop,
    IncreaseQuantity,
    DecreaseQuantity,
    RemoveItem,
    AddToCart,
    ToggleMobileMenu,
}

impl Action {
    /// Every action, in dispatch order.
    pub const ALL: [Self; 8] = [
        Self::OpenCart,
        Self::CloseCart,
        Self::DismissBackdrop,
        Self::IncreaseQuantity,
        Self::DecreaseQuantity,
        Self::RemoveItem,
        Self::AddToCart,
        Self::ToggleMobileMenu,
    ];

    /// The `data-action` value for this action.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::OpenCart => "open-cart",
            Self::CloseCart => "close-cart",
            Self::DismissBackdrop => "dismiss-backdrop",
            Self::IncreaseQuantity => "increase-qty",
            Self::DecreaseQuantity => "decrease-qty",
            Self::RemoveItem => "remove-item",
            Self::AddToCart => "add-to-cart",
            Self::ToggleMobileMenu => "toggle-mobile-menu",
        }
    }

    /// How far up the click path this action looks.
    ///
    /// The backdrop only closes the cart when it is clicked itself, not when
    /// a click inside the panel bubbles through it.
    #[must_use]
    pub const fn reach(self) -> Reach {
        match self {
            Self::OpenCart | Self::CloseCart | Self::ToggleMobileMenu => Reach::Closest,
            Self::DismissBackdrop
            | Self::IncreaseQuantity
            | Self::DecreaseQuantity
            | Self::RemoveItem
            | Self::AddToCart => Reach::Target,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.tag() == tag)
            .ok_or_else(|| format!("unknown action {tag:?}"))
    }
}

/// One element on a click's propagation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventNode {
    /// Handle of the element in the document, if the host tracks it.
    pub node: Option<NodeRef>,
    /// The element's `data-action`.
    pub action: Option<String>,
    /// The element's other `data-*` attributes, without the prefix.
    pub data: BTreeMap<String, String>,
}

impl EventNode {
    /// An untagged element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element's document handle.
    #[must_use]
    pub const fn with_node(mut self, node: NodeRef) -> Self {
        self.node = Some(node);
        self
    }

    /// Tag the element with `action`.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action.tag().to_string());
        self
    }

    /// Add a `data-*` attribute.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    fn is(&self, action: Action) -> bool {
        self.action.as_deref() == Some(action.tag())
    }

    /// The `data-id` value as an item id.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if the attribute is missing or not an integer.
    pub fn item_id(&self) -> Result<ItemId, PayloadError> {
        let raw = self
            .data
            .get(ITEM_ID_KEY)
            .ok_or(PayloadError::MissingItemId)?;
        raw.parse()
            .map_err(|_| PayloadError::InvalidItemId(raw.clone()))
    }
}

/// A click, described by its propagation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    path: Vec<EventNode>,
}

impl ClickEvent {
    /// A click on `target`.
    #[must_use]
    pub fn on(target: EventNode) -> Self {
        Self { path: vec![target] }
    }

    /// Add the next ancestor up the path.
    #[must_use]
    pub fn within(mut self, ancestor: EventNode) -> Self {
        self.path.push(ancestor);
        self
    }

    /// The clicked element.
    #[must_use]
    pub fn target(&self) -> Option<&EventNode> {
        self.path.first()
    }

    /// The clicked element followed by its ancestors.
    #[must_use]
    pub fn path(&self) -> &[EventNode] {
        &self.path
    }

    /// The element `action` applies to, honouring its reach.
    fn matching(&self, action: Action) -> Option<&EventNode> {
        match action.reach() {
            Reach::Target => self.target().filter(|node| node.is(action)),
            Reach::Closest => self.path.iter().find(|node| node.is(action)),
        }
    }

    /// The nearest element, starting at the target, carrying an item payload.
    fn closest_payload(&self) -> Option<&str> {
        self.path
            .iter()
            .find_map(|node| node.data.get(ITEM_PAYLOAD_KEY))
            .map(String::as_str)
    }
}

/// Parse a serialized menu item from a `data-item` attribute.
///
/// # Errors
///
/// Returns `PayloadError::Malformed` if `raw` isn't a JSON item object.
pub fn parse_item_payload(raw: &str) -> Result<NewItem, PayloadError> {
    Ok(serde_json::from_str(raw)?)
}

type Handler = fn(&Dispatcher, &ClickEvent, &EventNode);

/// Action -> handler lookup table.
const HANDLERS: &[(Action, Handler)] = &[
    (Action::OpenCart, Dispatcher::open_cart),
    (Action::CloseCart, Dispatcher::close_cart),
    (Action::DismissBackdrop, Dispatcher::close_cart),
    (Action::IncreaseQuantity, Dispatcher::increase_quantity),
    (Action::DecreaseQuantity, Dispatcher::decrease_quantity),
    (Action::RemoveItem, Dispatcher::remove_item),
    (Action::AddToCart, Dispatcher::add_to_cart),
    (Action::ToggleMobileMenu, Dispatcher::toggle_mobile_menu),
];

/// Delays used by the dispatcher's deferred effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub added_label_delay: Duration,
    pub modal_hide_delay: Duration,
}

impl From<&CartConfig> for DispatchSettings {
    fn from(config: &CartConfig) -> Self {
        Self {
            added_label_delay: config.added_label_delay,
            modal_hide_delay: config.modal_hide_delay,
        }
    }
}

/// Maps clicks onto cart mutations and panel open/close.
#[derive(Clone)]
pub struct Dispatcher {
    api: CartApi,
    shell: ShellInjector,
    document: Arc<dyn Document>,
    timers: Arc<Mutex<TimerQueue>>,
    settings: DispatchSettings,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("api", &self.api)
            .field("settings", &self.settings)
            .field("pending_timers", &self.timers.lock().pending())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(
        api: CartApi,
        shell: ShellInjector,
        document: Arc<dyn Document>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            api,
            shell,
            document,
            timers: Arc::new(Mutex::new(TimerQueue::new())),
            settings,
        }
    }

    /// Run every action the click matches. Returns the actions that fired.
    #[instrument(skip_all, fields(target = ?event.target().and_then(|t| t.action.as_deref())))]
    pub fn dispatch(&self, event: &ClickEvent) -> Vec<Action> {
        let mut fired = Vec::new();
        for (action, handler) in HANDLERS {
            if let Some(node) = event.matching(*action) {
                tracing::debug!(%action, "dispatching");
                handler(self, event, node);
                fired.push(*action);
            }
        }
        fired
    }

    /// Advance the timer clock and apply every effect now due. Returns how
    /// many were applied.
    pub fn advance_timers(&self, elapsed: Duration) -> usize {
        // The lock is released before applying so effects may schedule more.
        let due = self.timers.lock().advance(elapsed);
        for effect in &due {
            self.apply(effect);
        }
        due.len()
    }

    /// Number of deferred effects still waiting.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.lock().pending()
    }

    fn apply(&self, effect: &DeferredEffect) {
        match effect {
            DeferredEffect::RestoreLabel { node, label } => self.document.set_text(*node, label),
            DeferredEffect::HideModal => {
                if let Some(modal) = self.document.element_by_id(regions::CART_MODAL) {
                    self.document.add_classes(modal, &["invisible", "opacity-0"]);
                }
            }
        }
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    fn open_cart(&self, _event: &ClickEvent, _node: &EventNode) {
        let Some(modal) = self.document.element_by_id(regions::CART_MODAL) else {
            return;
        };
        self.document.remove_classes(modal, &["invisible", "opacity-0"]);
        if let Some(panel) = self.document.element_by_id(regions::CART_PANEL) {
            self.document.remove_classes(panel, &["translate-x-full"]);
        }
    }

    fn close_cart(&self, _event: &ClickEvent, _node: &EventNode) {
        if self.document.element_by_id(regions::CART_MODAL).is_none() {
            return;
        }
        if let Some(panel) = self.document.element_by_id(regions::CART_PANEL) {
            self.document.add_classes(panel, &["translate-x-full"]);
        }
        // Hide the backdrop once the slide-out animation has finished.
        self.timers
            .lock()
            .schedule(self.settings.modal_hide_delay, DeferredEffect::HideModal);
    }

    fn increase_quantity(&self, _event: &ClickEvent, node: &EventNode) {
        self.adjust(node, 1);
    }

    fn decrease_quantity(&self, _event: &ClickEvent, node: &EventNode) {
        self.adjust(node, -1);
    }

    fn adjust(&self, node: &EventNode, delta: i32) {
        match node.item_id() {
            Ok(id) => {
                self.api.update_quantity(id, delta);
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring quantity change"),
        }
    }

    fn remove_item(&self, _event: &ClickEvent, node: &EventNode) {
        match node.item_id() {
            Ok(id) => {
                self.api.remove_item(id);
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring remove"),
        }
    }

    fn add_to_cart(&self, event: &ClickEvent, node: &EventNode) {
        let Some(raw) = event.closest_payload() else {
            tracing::debug!(error = %PayloadError::MissingPayload, "add-to-cart click ignored");
            return;
        };

        let item = match parse_item_payload(raw) {
            Ok(item) => item,
            Err(e) => {
                tracing::error!(error = %e, "Could not parse item data from element");
                return;
            }
        };

        // A rejected item is logged by the API; the control still confirms
        // the click, as it does for any payload that parses.
        let _ = self.api.add_item(item);

        if let Some(button) = node.node {
            self.document.set_text(button, ADDED_LABEL);
            self.timers.lock().schedule(
                self.settings.added_label_delay,
                DeferredEffect::RestoreLabel {
                    node: button,
                    label: ADD_LABEL.to_string(),
                },
            );
        }
    }

    fn toggle_mobile_menu(&self, _event: &ClickEvent, _node: &EventNode) {
        self.shell.toggle_mobile_menu();
    }
}
