//! Shared header and footer.
//!
//! Every page has empty placeholder regions for the site header and footer;
//! the injector fills them once when the page is ready. The header carries
//! the cart-open control and the badge the cart renderer writes to.

use std::sync::Arc;

use askama::Template;
use tracing::instrument;

use crate::config::SiteConfig;
use crate::document::{Document, regions};
use crate::error::Result;
use crate::filters;

/// A top-level navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    /// SVG path data for the 20x20 icon.
    pub icon_path: &'static str,
}

/// Site navigation, in display order.
pub const NAV_LINKS: &[NavLink] = &[
    NavLink {
        href: "index.html",
        label: "Home",
        icon_path: "M10.707 2.293a1 1 0 00-1.414 0l-7 7a1 1 0 001.414 1.414L4 10.414V17a1 1 0 001 1h2a1 1 0 001-1v-2a1 1 0 011-1h2a1 1 0 011 1v2a1 1 0 001 1h2a1 1 0 001-1v-6.586l.293.293a1 1 0 001.414-1.414l-7-7z",
    },
    NavLink {
        href: "about.html",
        label: "About",
        icon_path: "M18 10a8 8 0 11-16 0 8 8 0 0116 0zm-7-4a1 1 0 11-2 0 1 1 0 012 0zM9 9a1 1 0 000 2v3a1 1 0 001 1h1a1 1 0 100-2v-3a1 1 0 00-1-1H9z",
    },
    NavLink {
        href: "menu.html",
        label: "Menu",
        icon_path: "M3 4a1 1 0 011-1h12a1 1 0 011 1v2a1 1 0 01-1 1H4a1 1 0 01-1-1V4zM3 10a1 1 0 011-1h6a1 1 0 011 1v6a1 1 0 01-1 1H4a1 1 0 01-1-1v-6zM14 9a1 1 0 00-1 1v6a1 1 0 001 1h2a1 1 0 001-1v-6a1 1 0 00-1-1h-2z",
    },
    NavLink {
        href: "rewards.html",
        label: "Rewards",
        icon_path: "M5 4a2 2 0 012-2h6a2 2 0 012 2v14l-5-2.5L5 18V4z",
    },
    NavLink {
        href: "contact.html",
        label: "Contact",
        icon_path: "M2 3a1 1 0 011-1h2.153a1 1 0 01.986.836l.74 4.435a1 1 0 01-.54 1.06l-1.548.773a11.037 11.037 0 006.105 6.105l.774-1.548a1 1 0 011.059-.54l4.435.74a1 1 0 01.836.986V17a1 1 0 01-1 1h-2C7.82 18 2 12.18 2 5V3z",
    },
];

/// Layout classes applied to the header placeholder.
const HEADER_CLASSES: &[&str] = &[
    "fixed",
    "top-0",
    "left-0",
    "right-0",
    "z-50",
    "transition-all",
    "duration-300",
    "bg-white/80",
    "backdrop-blur-sm",
    "shadow-md",
];

/// Layout classes applied to the footer placeholder.
const FOOTER_CLASSES: &[&str] = &["bg-gray-800", "text-white", "py-8", "mt-auto"];

/// Class that hides the mobile menu.
const HIDDEN: &str = "hidden";

/// Site header.
#[derive(Template)]
#[template(path = "shell/header.html")]
pub struct HeaderTemplate<'a> {
    pub brand_name: &'a str,
    pub logo_path: &'a str,
    pub nav_links: &'a [NavLink],
}

/// Site footer.
#[derive(Template)]
#[template(path = "shell/footer.html")]
pub struct FooterTemplate<'a> {
    pub brand_name: &'a str,
}

/// Fills the header and footer placeholders.
#[derive(Clone)]
pub struct ShellInjector {
    document: Arc<dyn Document>,
    site: SiteConfig,
}

impl std::fmt::Debug for ShellInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellInjector")
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

impl ShellInjector {
    /// Create an injector for `document`.
    pub fn new(document: Arc<dyn Document>, site: SiteConfig) -> Self {
        Self { document, site }
    }

    /// Inject the header and footer into whichever placeholders exist.
    #[instrument(skip(self))]
    pub fn inject(&self) {
        if let Some(header) = self.document.element_by_id(regions::HEADER_PLACEHOLDER) {
            match self.header_html() {
                Ok(html) => {
                    self.document.add_classes(header, HEADER_CLASSES);
                    self.document.set_inner_html(header, &html);
                }
                Err(e) => tracing::error!(error = %e, "Failed to render header"),
            }
        }

        if let Some(footer) = self.document.element_by_id(regions::FOOTER_PLACEHOLDER) {
            match self.footer_html() {
                Ok(html) => {
                    self.document.add_classes(footer, FOOTER_CLASSES);
                    self.document.set_inner_html(footer, &html);
                }
                Err(e) => tracing::error!(error = %e, "Failed to render footer"),
            }
        }
    }

    /// Show or hide the mobile navigation. Returns whether it is now visible;
    /// `None` if the page has no mobile menu.
    pub fn toggle_mobile_menu(&self) -> Option<bool> {
        let menu = self.document.element_by_id(regions::MOBILE_MENU)?;
        let hidden = self.document.toggle_class(menu, HIDDEN);
        Some(!hidden)
    }

    /// Header markup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Template` if the template fails to render.
    pub fn header_html(&self) -> Result<String> {
        Ok(HeaderTemplate {
            brand_name: &self.site.brand_name,
            logo_path: &self.site.logo_path,
            nav_links: NAV_LINKS,
        }
        .render()?)
    }

    /// Footer markup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Template` if the template fails to render.
    pub fn footer_html(&self) -> Result<String> {
        Ok(FooterTemplate {
            brand_name: &self.site.brand_name,
        }
        .render()?)
    }
}
