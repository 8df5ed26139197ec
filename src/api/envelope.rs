//! JSON envelopes wrapped around every `/api` payload.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;

use crate::clock::{iso_timestamp, Reading};
use crate::entropy::RandomSource;
use crate::generators::NodeIdentity;
use crate::telemetry::{ProfileKind, SynthProfile};

use super::endpoint::{method_list, Endpoint};
use super::error::ApiError;

/// Probability that a response reports a cache hit.
const CACHE_HIT_RATE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Debug, Serialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Unix seconds at which the window resets.
    pub reset: u64,
}

#[derive(Debug, Serialize)]
pub struct NodeMetadata {
    pub node_id: String,
    pub region: String,
    pub rate_limit: RateLimit,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub api_version: &'static str,
    pub profile: ProfileKind,
    pub response_time_ms: u64,
    pub cache_status: CacheStatus,
    #[serde(flatten)]
    pub node: Option<NodeMetadata>,
}

impl Metadata {
    /// Fabricated timings and cache state; node identity for extended profiles.
    pub fn generate<R: RandomSource + ?Sized>(
        reading: &Reading,
        rng: &mut R,
        profile: &SynthProfile,
        node: &NodeIdentity,
    ) -> Self {
        let response_time_ms = (rng.uniform() * 50.0 + 10.0).round() as u64;
        let cache_status = if rng.uniform() > 1.0 - CACHE_HIT_RATE {
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        };

        let node = profile.extended_metadata.then(|| {
            let limit = profile.rate_limit_per_minute;
            let used = (rng.uniform() * limit as f64 * 0.2).floor() as u64;
            let now_secs = reading.now_ms.max(0) as u64 / 1000;
            NodeMetadata {
                node_id: node.node_id.clone(),
                region: node.region.clone(),
                rate_limit: RateLimit {
                    limit,
                    remaining: limit.saturating_sub(used),
                    reset: (now_secs / 60 + 1) * 60,
                },
            }
        });

        Self {
            api_version: profile.api_version,
            profile: profile.kind,
            response_time_ms,
            cache_status,
            node,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub timestamp: String,
    pub data: T,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<&'static str>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(at: DateTime<Utc>, data: T, metadata: Metadata, profile: &SynthProfile) -> Self {
        Self {
            success: true,
            timestamp: iso_timestamp(at),
            data,
            metadata,
            status: profile.envelope_status.then_some("operational"),
            network: profile.envelope_status.then_some(profile.network_name),
        }
    }

    /// Replaces the reported network status; profiles without envelope
    /// status fields stay without one.
    pub fn with_status(mut self, status: &'static str) -> Self {
        if self.status.is_some() {
            self.status = Some(status);
        }
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub timestamp: String,
    pub error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_endpoints: Option<Vec<&'static str>>,
}

impl ErrorEnvelope {
    pub fn from_error(err: &ApiError, at: DateTime<Utc>, dev_mode: bool) -> Self {
        let allowed_methods = match err {
            ApiError::MethodNotAllowed { allowed, .. } => {
                Some(allowed.iter().map(|m| m.as_str().to_string()).collect())
            }
            _ => None,
        };
        let available_endpoints = matches!(err, ApiError::NotFound(_)).then(Endpoint::names);
        Self {
            success: false,
            timestamp: iso_timestamp(at),
            error: ErrorBody {
                code: err.code(),
                message: err.client_message(dev_mode),
                allowed_methods,
            },
            available_endpoints,
        }
    }
}

/// Logs server-side failures and renders the error envelope.
pub fn failure(err: &ApiError, at: DateTime<Utc>, dev_mode: bool) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(code = err.code(), err = %err, "API error");
    } else {
        tracing::debug!(code = err.code(), status = status.as_u16(), err = %err, "request rejected");
    }

    let body = ErrorEnvelope::from_error(err, at, dev_mode);
    let mut resp = (status, Json(body)).into_response();
    if let ApiError::MethodNotAllowed { allowed, .. } = err {
        if let Ok(value) = HeaderValue::from_str(&method_list(allowed)) {
            resp.headers_mut().insert(header::ALLOW, value);
        }
    }
    resp
}

/// Used by the panic-catching layer; never exposes the panic payload.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    crate::prom::record_request("panic", 500);
    failure(&ApiError::Internal(detail.to_string()), Utc::now(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::profile::{BASIC, EXTENDED, STANDARD};
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    fn at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn metadata_ranges() {
        let node = NodeIdentity::new("eu-west", at());
        let reading = Reading::new(at());
        let mut hits = 0;
        for seed in 0..1_000u64 {
            let m = Metadata::generate(&reading, &mut StdRng::seed_from_u64(seed), &EXTENDED, &node);
            assert!((10..=60).contains(&m.response_time_ms));
            let node_meta = m.node.expect("extended metadata");
            assert!(node_meta.rate_limit.remaining <= node_meta.rate_limit.limit);
            assert!(node_meta.rate_limit.reset > 1_700_000_000);
            if m.cache_status == CacheStatus::Hit {
                hits += 1;
            }
        }
        // roughly 30% hits
        assert!((200..400).contains(&hits), "hits={hits}");
    }

    #[test]
    fn basic_metadata_has_no_node_fields() {
        let node = NodeIdentity::new("local", at());
        let m = Metadata::generate(&Reading::new(at()), &mut StdRng::seed_from_u64(1), &BASIC, &node);
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("node_id").is_none());
        assert!(json.get("rate_limit").is_none());
        assert_eq!(json["api_version"], "2.2.0");
    }

    #[test]
    fn envelope_status_fields_follow_profile() {
        let node = NodeIdentity::new("local", at());
        let reading = Reading::new(at());
        let meta = Metadata::generate(&reading, &mut StdRng::seed_from_u64(1), &BASIC, &node);
        let basic = serde_json::to_value(Envelope::new(at(), 1, meta, &BASIC)).unwrap();
        assert!(basic.get("status").is_none());
        assert_eq!(basic["timestamp"], "2023-11-14T22:13:20.000Z");

        let meta = Metadata::generate(&reading, &mut StdRng::seed_from_u64(1), &STANDARD, &node);
        let standard = serde_json::to_value(Envelope::new(at(), 1, meta, &STANDARD)).unwrap();
        assert_eq!(standard["status"], "operational");
        assert_eq!(standard["network"], "TriUnity Mainnet");
    }

    #[test]
    fn status_override_respects_profile() {
        let node = NodeIdentity::new("local", at());
        let reading = Reading::new(at());
        let meta = Metadata::generate(&reading, &mut StdRng::seed_from_u64(1), &STANDARD, &node);
        let env = Envelope::new(at(), 1, meta, &STANDARD).with_status("degraded");
        assert_eq!(serde_json::to_value(env).unwrap()["status"], "degraded");

        let meta = Metadata::generate(&reading, &mut StdRng::seed_from_u64(1), &BASIC, &node);
        let env = Envelope::new(at(), 1, meta, &BASIC).with_status("degraded");
        assert!(serde_json::to_value(env).unwrap().get("status").is_none());
    }

    #[tokio::test]
    async fn panic_payload_is_masked() {
        let resp = panic_response(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(json["error"]["message"], crate::api::error::INTERNAL_MESSAGE);
    }

    #[test]
    fn oversized_body_keeps_envelope() {
        let env = ErrorEnvelope::from_error(&ApiError::PayloadTooLarge(1024), at(), false);
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(json["error"]["message"].as_str().unwrap().contains("1024"));
    }

    #[test]
    fn not_found_lists_endpoints() {
        let env = ErrorEnvelope::from_error(&ApiError::NotFound("x".into()), at(), false);
        let json = serde_json::to_value(env).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["available_endpoints"].as_array().unwrap().len(), 6);
    }
}
