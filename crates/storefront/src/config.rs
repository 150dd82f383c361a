//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CART_STORAGE_KEY` - Storage key holding the cart (default: cart)
//! - `CART_ADDED_LABEL_MS` - How long an add-to-cart button reads "Added!" (default: 1000)
//! - `CART_MODAL_HIDE_MS` - Delay before the modal hides after closing (default: 300)
//! - `CART_PLACEHOLDER_IMAGE` - Image shown for lines without a usable image
//! - `CART_CURRENCY_PREFIX` - Prefix for displayed prices (default: RM)
//! - `CART_CHECKOUT_URL` - Target of the checkout link (default: checkout.html)
//! - `SITE_BRAND_NAME` - Brand shown in the header and footer (default: AYMODINES)
//! - `SITE_LOGO_PATH` - Header logo (default: assets/logorestaurant.PNG)

use std::time::Duration;

use thiserror::Error;

const DEFAULT_STORAGE_KEY: &str = "cart";
const DEFAULT_ADDED_LABEL_MS: u64 = 1000;
const DEFAULT_MODAL_HIDE_MS: u64 = 300;
const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://placehold.co/64x64/eee/ccc?text=Item";
const DEFAULT_CURRENCY_PREFIX: &str = "RM";
const DEFAULT_CHECKOUT_URL: &str = "checkout.html";
const DEFAULT_BRAND_NAME: &str = "AYMODINES";
const DEFAULT_LOGO_PATH: &str = "assets/logorestaurant.PNG";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart behaviour and presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Storage key the cart is saved under
    pub storage_key: String,
    /// How long the add-to-cart confirmation label stays up
    pub added_label_delay: Duration,
    /// Delay between sliding the panel out and hiding the modal
    pub modal_hide_delay: Duration,
    /// Fallback image for cart lines
    pub placeholder_image: String,
    /// Prefix for formatted prices
    pub currency_prefix: String,
    /// Link target of the checkout button
    pub checkout_url: String,
    /// Shared header/footer settings
    pub site: SiteConfig,
}

/// Branding used by the injected header and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Brand name
    pub brand_name: String,
    /// Path to the header logo
    pub logo_path: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            added_label_delay: Duration::from_millis(DEFAULT_ADDED_LABEL_MS),
            modal_hide_delay: Duration::from_millis(DEFAULT_MODAL_HIDE_MS),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
            checkout_url: DEFAULT_CHECKOUT_URL.to_string(),
            site: SiteConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            logo_path: DEFAULT_LOGO_PATH.to_string(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_key = get_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            storage_key,
            added_label_delay: get_millis(&lookup, "CART_ADDED_LABEL_MS", DEFAULT_ADDED_LABEL_MS)?,
            modal_hide_delay: get_millis(&lookup, "CART_MODAL_HIDE_MS", DEFAULT_MODAL_HIDE_MS)?,
            placeholder_image: get_or_default(
                &lookup,
                "CART_PLACEHOLDER_IMAGE",
                DEFAULT_PLACEHOLDER_IMAGE,
            ),
            currency_prefix: get_or_default(&lookup, "CART_CURRENCY_PREFIX", DEFAULT_CURRENCY_PREFIX),
            checkout_url: get_or_default(&lookup, "CART_CHECKOUT_URL", DEFAULT_CHECKOUT_URL),
            site: SiteConfig {
                brand_name: get_or_default(&lookup, "SITE_BRAND_NAME", DEFAULT_BRAND_NAME),
                logo_path: get_or_default(&lookup, "SITE_LOGO_PATH", DEFAULT_LOGO_PATH),
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Get a millisecond duration with a default value.
fn get_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    lookup(key).map_or(Ok(Duration::from_millis(default)), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = CartConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage_key, "cart");
        assert_eq!(config.added_label_delay, Duration::from_millis(1000));
        assert_eq!(config.modal_hide_delay, Duration::from_millis(300));
        assert_eq!(config.currency_prefix, "RM");
        assert_eq!(config.checkout_url, "checkout.html");
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("CART_STORAGE_KEY", "aymodines-cart"),
            ("CART_ADDED_LABEL_MS", "1500"),
            ("CART_MODAL_HIDE_MS", " 0 "),
            ("CART_CURRENCY_PREFIX", "MYR"),
            ("SITE_BRAND_NAME", "Kedai"),
        ]))
        .unwrap();

        assert_eq!(config.storage_key, "aymodines-cart");
        assert_eq!(config.added_label_delay, Duration::from_millis(1500));
        assert_eq!(config.modal_hide_delay, Duration::ZERO);
        assert_eq!(config.currency_prefix, "MYR");
        assert_eq!(config.site.brand_name, "Kedai");
        assert_eq!(config.site.logo_path, "assets/logorestaurant.PNG");
    }

    #[test]
    fn test_invalid_delay() {
        let err = CartConfig::from_lookup(lookup_from(&[("CART_MODAL_HIDE_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CART_MODAL_HIDE_MS"));
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let err = CartConfig::from_lookup(lookup_from(&[("CART_STORAGE_KEY", "  ")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid environment variable CART_STORAGE_KEY: must not be empty"
        );
    }
}
