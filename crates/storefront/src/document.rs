//! The page the cart draws into.
//!
//! [`Document`] is the handful of DOM calls the cart needs. Like DOM element
//! handles, every method takes `&self`; implementations manage their own
//! interior mutability. Every region the cart touches is optional, and a
//! page without it is simply skipped.
//!
//! [`MemoryDocument`] is a headless implementation for tests and non-browser
//! hosts.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use parking_lot::RwLock;
use regex::Regex;

/// Element ids the cart and the site shell agree on.
pub mod regions {
    /// Unit-count badge inside the cart-open control.
    pub const CART_BADGE: &str = "cart-count";
    /// Slide-in panel listing the cart lines.
    pub const CART_PANEL: &str = "cart-panel";
    /// Backdrop wrapping the cart panel.
    pub const CART_MODAL: &str = "cart-modal";
    /// Where the shared header is injected.
    pub const HEADER_PLACEHOLDER: &str = "header-placeholder";
    /// Where the shared footer is injected.
    pub const FOOTER_PLACEHOLDER: &str = "footer-placeholder";
    /// Collapsible navigation for small screens.
    pub const MOBILE_MENU: &str = "mobile-menu";
}

/// Opaque handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u64);

impl NodeRef {
    /// Wrap a host-assigned handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-assigned handle.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// DOM operations used by the cart.
pub trait Document: Send + Sync {
    /// Find the element with `id`.
    fn element_by_id(&self, id: &str) -> Option<NodeRef>;

    /// Replace the element's children with plain text.
    fn set_text(&self, node: NodeRef, text: &str);

    /// Replace the element's children with `html`.
    fn set_inner_html(&self, node: NodeRef, html: &str);

    /// Add each class in `classes`.
    fn add_classes(&self, node: NodeRef, classes: &[&str]);

    /// Remove each class in `classes`.
    fn remove_classes(&self, node: NodeRef, classes: &[&str]);

    /// Flip `class`; returns whether it is now present.
    fn toggle_class(&self, node: NodeRef, class: &str) -> bool;
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[a-zA-Z][a-zA-Z0-9-]*\b([^>]*)>").expect("Invalid regex"));

static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w-]+)\s*=\s*"([^"]*)""#).expect("Invalid regex"));

#[derive(Debug, Default)]
struct Node {
    id: Option<String>,
    parent: Option<NodeRef>,
    classes: BTreeSet<String>,
    text: Option<String>,
    html: Option<String>,
}

#[derive(Debug, Default)]
struct Arena {
    next: u64,
    nodes: BTreeMap<NodeRef, Node>,
}

impl Arena {
    fn insert(&mut self, node: Node) -> NodeRef {
        self.next += 1;
        let handle = NodeRef(self.next);
        self.nodes.insert(handle, node);
        handle
    }

    fn remove_descendants(&mut self, root: NodeRef) {
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let children: Vec<NodeRef> = self
                .nodes
                .iter()
                .filter(|(_, node)| node.parent == Some(parent))
                .map(|(handle, _)| *handle)
                .collect();
            for child in children {
                self.nodes.remove(&child);
                stack.push(child);
            }
        }
    }
}

/// Headless in-memory document.
///
/// Markup set with [`Document::set_inner_html`] is kept as a string; any
/// element in it that carries an `id` attribute becomes addressable, with
/// the classes from its `class` attribute. Replacing an element's content
/// drops whatever was registered under it before.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    arena: RwLock<Arena>,
}

impl MemoryDocument {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level element with an optional id and initial classes.
    pub fn create_element(&self, id: Option<&str>, classes: &[&str]) -> NodeRef {
        self.arena.write().insert(Node {
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            ..Node::default()
        })
    }

    /// Add an element under `parent`.
    pub fn append_child(&self, parent: NodeRef, id: Option<&str>, classes: &[&str]) -> NodeRef {
        self.arena.write().insert(Node {
            id: id.map(str::to_string),
            parent: Some(parent),
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            ..Node::default()
        })
    }

    /// Whether `node` is still part of the document.
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        self.arena.read().nodes.contains_key(&node)
    }

    /// Text set with [`Document::set_text`], if that was the last write.
    #[must_use]
    pub fn text(&self, node: NodeRef) -> Option<String> {
        self.arena.read().nodes.get(&node)?.text.clone()
    }

    /// Markup set with [`Document::set_inner_html`], if that was the last write.
    #[must_use]
    pub fn inner_html(&self, node: NodeRef) -> Option<String> {
        self.arena.read().nodes.get(&node)?.html.clone()
    }

    /// Whether `node` carries `class`.
    #[must_use]
    pub fn has_class(&self, node: NodeRef, class: &str) -> bool {
        self.arena
            .read()
            .nodes
            .get(&node)
            .is_some_and(|n| n.classes.contains(class))
    }

    /// Text of the element with `id`, for assertions.
    #[must_use]
    pub fn text_of(&self, id: &str) -> Option<String> {
        self.element_by_id(id).and_then(|node| self.text(node))
    }

    /// Markup of the element with `id`, for assertions.
    #[must_use]
    pub fn html_of(&self, id: &str) -> Option<String> {
        self.element_by_id(id).and_then(|node| self.inner_html(node))
    }
}

impl Document for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        self.arena
            .read()
            .nodes
            .iter()
            .find(|(_, node)| node.id.as_deref() == Some(id))
            .map(|(handle, _)| *handle)
    }

    fn set_text(&self, node: NodeRef, text: &str) {
        let mut arena = self.arena.write();
        if !arena.nodes.contains_key(&node) {
            return;
        }
        arena.remove_descendants(node);
        if let Some(target) = arena.nodes.get_mut(&node) {
            target.text = Some(text.to_string());
            target.html = None;
        }
    }

    fn set_inner_html(&self, node: NodeRef, html: &str) {
        let mut arena = self.arena.write();
        if !arena.nodes.contains_key(&node) {
            return;
        }
        arena.remove_descendants(node);
        if let Some(target) = arena.nodes.get_mut(&node) {
            target.html = Some(html.to_string());
            target.text = None;
        }

        for tag in TAG_RE.captures_iter(html) {
            let Some(attrs) = tag.get(1) else { continue };
            let mut id = None;
            let mut classes = BTreeSet::new();
            for attr in ATTR_RE.captures_iter(attrs.as_str()) {
                match (attr.get(1).map(|m| m.as_str()), attr.get(2)) {
                    (Some("id"), Some(value)) => id = Some(value.as_str().to_string()),
                    (Some("class"), Some(value)) => {
                        classes = value.as_str().split_whitespace().map(str::to_string).collect();
                    }
                    _ => {}
                }
            }
            if id.is_some() {
                arena.insert(Node {
                    id,
                    parent: Some(node),
                    classes,
                    ..Node::default()
                });
            }
        }
    }

    fn add_classes(&self, node: NodeRef, classes: &[&str]) {
        if let Some(target) = self.arena.write().nodes.get_mut(&node) {
            target
                .classes
                .extend(classes.iter().map(|c| (*c).to_string()));
        }
    }

    fn remove_classes(&self, node: NodeRef, classes: &[&str]) {
        if let Some(target) = self.arena.write().nodes.get_mut(&node) {
            for class in classes {
                target.classes.remove(*class);
            }
        }
    }

    fn toggle_class(&self, node: NodeRef, class: &str) -> bool {
        let mut arena = self.arena.write();
        let Some(target) = arena.nodes.get_mut(&node) else {
            return false;
        };
        if target.classes.remove(class) {
            false
        } else {
            target.classes.insert(class.to_string());
            true
        }
    }
}
