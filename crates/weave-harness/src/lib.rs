#![forbid(unsafe_code)]

//! Headless render harness for Weave components.
//!
//! Mount a component into a [`TestContext`], find elements with CSS-like
//! selectors, dispatch events, and move virtual time to fire debounce timers.
//!
//! ```ignore
//! let ctx = TestContext::new();
//! let field = ctx.render_with(|app| TextField::from_params(&params, app))?;
//! field.input("input", "hello")?;
//! ctx.advance_ms(200);
//! assert_eq!(field.instance().value().get(), "hello");
//! ```

pub mod context;
pub mod rendered;
pub mod selector;

pub use context::TestContext;
pub use rendered::RenderedComponent;
pub use selector::Selector;

use tracing_subscriber::EnvFilter;
use weave_runtime::RuntimeConfig;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "WEAVE_LOG";

/// Install a test-friendly `tracing` subscriber filtered by `WEAVE_LOG`
/// (falling back to the default config's `log_filter`).
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    init_tracing_with(&RuntimeConfig::default().with_env_overrides());
}

/// Like [`init_tracing`], falling back to `config.log_filter`.
pub fn init_tracing_with(config: &RuntimeConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(fallback = %config.log_filter, "tracing initialised");
    }
}
