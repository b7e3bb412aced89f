use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::{get, post},
};
use async_stream::stream as async_stream;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;

use crate::application::usecases::{DispatchOutcome, RedeemChannelPointsUseCase, RedeemOutcome};
use crate::domain::ChannelPointsRedemption;
use crate::infrastructure::event_bus::EventBus;

#[derive(Clone)]
pub struct ApiState {
    pub redeem: Arc<RedeemChannelPointsUseCase>,
    pub api_token: Option<String>,
    pub event_bus: Option<EventBus>,
    /// Ends open event streams so graceful shutdown can finish.
    pub shutdown: CancellationToken,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/redemptions/channel-points", post(channel_points))
        .route("/events/stream", get(stream_events))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn channel_points(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }

    let redemption: ChannelPointsRedemption = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("bad channel points payload: {e}");
            return (StatusCode::BAD_REQUEST, format!("invalid payload: {e}")).into_response();
        }
    };

    match state.redeem.execute(&redemption).await {
        RedeemOutcome::Ignored => {
            (StatusCode::ACCEPTED, Json(json!({ "ignored": true }))).into_response()
        }
        RedeemOutcome::Dispatched(DispatchOutcome::Suppressed) => {
            Json(json!({ "fired": false, "actions": 0 })).into_response()
        }
        RedeemOutcome::Dispatched(DispatchOutcome::Fired(n)) => {
            Json(json!({ "fired": true, "actions": n })).into_response()
        }
    }
}

#[derive(Deserialize)]
struct StreamQuery {
    event_key: Option<String>,
}

async fn stream_events(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(q): Query<StreamQuery>,
) -> impl IntoResponse {
    if let Err((code, msg)) = check_auth(&headers, &state.api_token) {
        return (code, msg).into_response();
    }

    let Some(bus) = state.event_bus.clone() else {
        return (
            StatusCode::NOT_IMPLEMENTED,
            "event stream not enabled".to_string(),
        )
            .into_response();
    };

    let key_filter = q.event_key;
    let live = BroadcastStream::new(bus.subscribe()).filter_map(move |msg| {
        // lagged receivers just drop what they missed
        let record = msg.ok()?;

        if let Some(key) = &key_filter {
            if record.event.event_key != *key {
                return None;
            }
        }

        let data = serde_json::to_string(&record).ok()?;
        let id = format!("{}:{}", record.at_millis, record.event.event_key);
        Some(Ok::<SseEvent, Infallible>(
            SseEvent::default().event("dispatch").id(id).data(data),
        ))
    });

    let shutdown = state.shutdown.clone();
    let out_stream = async_stream! {
        tokio::pin!(live);
        loop {
            let item = tokio::select! {
                _ = shutdown.cancelled() => None,
                item = live.next() => item,
            };
            match item {
                Some(item) => yield item,
                None => break,
            }
        }
    };

    Sse::new(out_stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn check_auth(headers: &HeaderMap, token: &Option<String>) -> Result<(), (StatusCode, String)> {
    // no token configured: open
    let Some(expected) = token else {
        return Ok(());
    };
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "unauthorized".to_string()))
    }
}

/// Length leaks, content does not.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn bearer(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("authorization", HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn token_compare_requires_exact_match() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
        assert!(!constant_time_eq(b"", b"secret"));
    }

    #[test]
    fn auth_needs_bearer_scheme_and_token() {
        let token = Some("secret".to_string());
        assert!(check_auth(&bearer("Bearer secret"), &token).is_ok());
        assert!(check_auth(&bearer("secret"), &token).is_err());
        assert!(check_auth(&bearer("Bearer "), &token).is_err());
        assert!(check_auth(&HeaderMap::new(), &token).is_err());
        assert!(check_auth(&HeaderMap::new(), &None).is_ok());
    }
}
