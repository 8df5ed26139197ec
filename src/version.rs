use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::telemetry::ProfileKind;

#[derive(Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub api_version: &'static str,
    pub profile: ProfileKind,
    pub git_commit: &'static str,
    pub uptime_seconds: u64,
    pub ts: u64,
}

async fn get_version(State(state): State<Arc<AppState>>) -> Json<VersionInfo> {
    let now = state.clock.now().timestamp().max(0) as u64;

    // Set by CI when available
    let git_commit = option_env!("GIT_COMMIT").unwrap_or("unknown");

    let info = VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        api_version: state.profile.api_version,
        profile: state.profile.kind,
        git_commit,
        uptime_seconds: state.uptime_secs(),
        ts: now,
    };
    Json(info)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/version", get(get_version))
}
