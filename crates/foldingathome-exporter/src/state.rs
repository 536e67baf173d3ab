//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use foldingathome_core::client::Connector;
use foldingathome_core::collector::Collector;

pub(crate) struct AppState<C: Connector> {
    pub(crate) collector: Collector<C>,
    /// Path the metrics are served on, linked from the landing page.
    pub(crate) metrics_path: String,
}

pub(crate) type SharedState<C> = Arc<AppState<C>>;
