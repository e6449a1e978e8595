//! Core library of the gopher delivery middleware.
//!
//! The crate is organised in two layers:
//!
//! - [`delivery`] holds the behaviour tree substrate, the delivery
//!   coordinator and the tower service facades through which goals are
//!   submitted and the robot's interaction hardware is driven.
//! - [`transport`] holds the navigation client implementations (gRPC,
//!   simulated loopback, nop) and the gRPC wire surface of the daemon.

pub mod delivery;
pub mod transport;

#[cfg(test)]
mod tests;

#[cfg(feature = "gopher_tracing")]
pub mod gopher_tracing {
    //! Tracing setup shared by binaries, benches and tests.

    use std::sync::Once;

    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    static INIT: Once = Once::new();

    /// Initialize the tracing subscriber once per process.
    ///
    /// The filter is taken from `RUST_LOG` and defaults to `off` so that
    /// test output stays quiet unless explicitly requested.
    pub fn init() {
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("off")).unwrap();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(true).compact().with_target(true))
                .init();
        });
    }
}
