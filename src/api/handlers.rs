use axum::body::{Body, HttpBody};
use axum::extract::{rejection::PathRejection, Path, Request, State};
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::clock::Reading;
use crate::entropy::RandomSource;
use crate::generators::{
    generate_blocks, generate_health, generate_status, generate_transactions,
    generate_validators, submit_transaction, SubmitTransaction,
};
use crate::telemetry::synthesize;

use super::endpoint::{profile_methods, Endpoint};
use super::envelope::{failure, Envelope, Metadata};
use super::error::ApiError;
use super::AppState;

/// ANY /api/:endpoint
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    segment: Result<Path<String>, PathRejection>,
    request: Request,
) -> Response {
    // a segment that doesn't decode can't name an endpoint
    let segment = match segment {
        Ok(Path(segment)) => segment,
        Err(_) => return unknown_path(&state, &method, &uri),
    };
    let label = Endpoint::from_segment(&segment)
        .map(|e| e.as_str())
        .unwrap_or("unknown");
    let result = route(&state, &method, &segment, request.into_body()).await;
    respond(&state, label, result)
}

/// Anything outside `/api/:endpoint`.
pub async fn fallback(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    unknown_path(&state, &method, &uri)
}

fn unknown_path(state: &AppState, method: &Method, uri: &Uri) -> Response {
    let result = check_method(state, method)
        .and_then(|_| Err(ApiError::NotFound(uri.path().to_string())));
    respond(state, "unknown", result)
}

fn respond(state: &AppState, label: &str, result: Result<Response, ApiError>) -> Response {
    let resp = match result {
        Ok(resp) => resp,
        Err(err) => failure(&err, state.clock.now(), state.config.dev_mode),
    };
    crate::prom::record_request(label, resp.status().as_u16());
    resp
}

fn check_method(state: &AppState, method: &Method) -> Result<(), ApiError> {
    let allowed = profile_methods(state.profile);
    if allowed.contains(method) {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed { method: method.clone(), allowed })
    }
}

async fn route(
    state: &AppState,
    method: &Method,
    segment: &str,
    body: Body,
) -> Result<Response, ApiError> {
    check_method(state, method)?;
    let endpoint =
        Endpoint::from_segment(segment).ok_or_else(|| ApiError::NotFound(segment.to_string()))?;
    if !endpoint.allows(method, state.profile) {
        return Err(ApiError::MethodNotAllowed {
            method: method.clone(),
            allowed: endpoint.allowed_methods(state.profile),
        });
    }

    // parse before touching the generator so a bad body never consumes entropy
    let submission = if *method == Method::POST {
        let body = read_body(body, state.config.max_body_bytes).await?;
        Some(parse_submission(&body)?)
    } else {
        None
    };

    let at = state.clock.now();
    let reading = Reading::new(at);
    let profile = state.profile;
    let node = &state.node;

    state.entropy.with(|rng| -> Result<Response, ApiError> {
        let resp = match (endpoint, submission) {
            (Endpoint::Metrics, _) => {
                let data = synthesize(&reading, &mut *rng, profile)?;
                envelope(state, at, &reading, rng, data).into_response()
            }
            (Endpoint::Status, _) => {
                let data = generate_status(&reading, &mut *rng, profile, node)?;
                let status = data.status.as_str();
                envelope(state, at, &reading, rng, data)
                    .with_status(status)
                    .into_response()
            }
            (Endpoint::Validators, _) => {
                let data = generate_validators(&reading, &mut *rng, profile)?;
                envelope(state, at, &reading, rng, data).into_response()
            }
            (Endpoint::Blocks, _) => {
                let data = generate_blocks(&reading, &mut *rng, profile)?;
                envelope(state, at, &reading, rng, data).into_response()
            }
            (Endpoint::Health, _) => {
                let data = generate_health(&reading, &mut *rng, profile, node)?;
                envelope(state, at, &reading, rng, data).into_response()
            }
            (Endpoint::Transactions, Some(request)) => {
                let data = submit_transaction(request, &reading, &mut *rng, profile)?;
                tracing::info!(hash = %data.hash, "transaction submission accepted");
                envelope(state, at, &reading, rng, data).into_response()
            }
            (Endpoint::Transactions, None) => {
                let data = generate_transactions(&reading, &mut *rng, profile)?;
                envelope(state, at, &reading, rng, data).into_response()
            }
        };
        Ok(resp)
    })
}

/// Buffers a submission body, refusing anything over `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<axum::body::Bytes, ApiError> {
    if body.size_hint().lower() > limit as u64 {
        return Err(ApiError::PayloadTooLarge(limit));
    }
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {e}")))
}

fn parse_submission(body: &[u8]) -> Result<SubmitTransaction, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmitTransaction::default());
    }
    let request: SubmitTransaction = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid transaction body: {e}")))?;
    request.validate().map_err(ApiError::BadRequest)?;
    Ok(request)
}

fn envelope<T: Serialize, R: RandomSource + ?Sized>(
    state: &AppState,
    at: DateTime<Utc>,
    reading: &Reading,
    rng: &mut R,
    data: T,
) -> Envelope<T> {
    let metadata = Metadata::generate(reading, rng, state.profile, &state.node);
    Envelope::new(at, data, metadata, state.profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_an_empty_submission() {
        let req = parse_submission(b"  \n").unwrap();
        assert!(req.from.is_none() && req.to.is_none() && req.amount.is_none());
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected() {
        let err = read_body(Body::from(vec![0u8; 2048]), 1024).await.unwrap_err();
        assert_eq!(err.code(), "PAYLOAD_TOO_LARGE");
        let ok = read_body(Body::from("{}"), 1024).await.unwrap();
        assert_eq!(&ok[..], b"{}");
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_submission(b"{not json").unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        let err = parse_submission(br#"{"amount": 0}"#).unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}
