//! HTTP surface
//!
//! - `endpoint` - the six operations and their accepted methods
//! - `headers` - fixed CORS/security header set, preflight handling
//! - `handlers` - dispatch from path segment to generator
//! - `envelope` - success/error JSON envelopes
//! - `error` - request error taxonomy

pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod headers;

use axum::http::{HeaderName, HeaderValue};
use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::clock::{Clock, Reading, SystemClock};
use crate::config::ServerConfig;
use crate::entropy::EntropySource;
use crate::generators::NodeIdentity;
use crate::telemetry::SynthProfile;

pub use endpoint::Endpoint;
pub use error::ApiError;

/// Shared, read-only request context.
pub struct AppState {
    pub config: ServerConfig,
    pub profile: &'static SynthProfile,
    pub clock: Arc<dyn Clock>,
    pub entropy: EntropySource,
    pub node: NodeIdentity,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        let profile = config.profile.profile();
        let node = NodeIdentity::new(config.region.clone(), clock.now());
        Self {
            entropy: EntropySource::from_seed(config.seed),
            headers: headers::header_set(profile),
            profile,
            clock,
            node,
            config,
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.node.uptime_secs(&Reading::new(self.clock.now()))
    }
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/api/:endpoint", any(handlers::dispatch))
        .route("/metrics.prom", get(crate::prom::metrics_prom))
        .merge(crate::version::router())
        .fallback(handlers::fallback);
    with_layers(routes, state)
}

/// Panic recovery, the fixed header set and request tracing around `routes`.
/// Body size is enforced by the one handler that reads a body.
pub fn with_layers(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .layer(CatchPanicLayer::custom(envelope::panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), headers::apply_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
