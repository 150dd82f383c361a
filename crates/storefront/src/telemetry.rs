//! Tracing setup for hosts embedding the cart.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "aymodines_storefront=info";

/// Install a global subscriber with an `EnvFilter` and a fmt layer.
///
/// Defaults to info level for this crate if `RUST_LOG` is not set. Returns
/// `false` if a global subscriber was already installed, so calling this more
/// than once is harmless.
pub fn init_tracing() -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
