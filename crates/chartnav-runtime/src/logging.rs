#![forbid(unsafe_code)]

//! Subscriber setup for hosts that do not bring their own.
//!
//! The crate itself only emits `tracing` events. Embedders with a subscriber
//! already installed should skip this module; everyone else can call
//! [`init`] once at startup. `RUST_LOG` wins over the filter passed in.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Output format of [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Install a global subscriber. Returns `false` if one was already set.
pub fn init(filter: &str, format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let installed = match format {
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(fmt::layer().json().with_target(true));
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Pretty => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(fmt::layer().with_target(true));
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    installed.is_ok()
}
