//! Payment provider webhooks.
//!
//! Stripe events are signature-verified and filtered against an event
//! allowlist before acknowledgment. Processing is acknowledge-only:
//! entitlement changes land through a separate reconciliation path, so
//! the handlers never mutate local state.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{info, warn};

use appforge_infra::billing;
use appforge_types::error::WebhookError;

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let Some(secret) = state.stripe_webhook_secret.as_ref() else {
        return Err(AppError::Internal(
            "stripe webhook secret not configured".to_string(),
        ));
    };

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    billing::verify_stripe_signature(secret.expose_secret().as_bytes(), &body, signature)?;

    let event: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid webhook payload: {e}")))?;
    let event_type = event
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Validation("webhook payload missing type".to_string()))?;

    if !billing::is_allowed_event(event_type) {
        warn!(event_type = %event_type, "ignoring untracked stripe event");
        return Ok(Json(json!({
            "received": true,
            "message": format!("skipping untracked event type: {event_type}"),
        })));
    }

    info!(event_type = %event_type, "stripe event acknowledged");
    Ok(Json(json!({ "received": true })))
}

/// Polar sends no verifiable signature on this path; events are
/// acknowledged unconditionally.
pub async fn polar(body: Bytes) -> &'static str {
    match serde_json::from_slice::<Value>(&body) {
        Ok(event) => {
            let event_type = event.get("type").and_then(Value::as_str).unwrap_or("unknown");
            info!(event_type = %event_type, "polar event acknowledged");
        }
        Err(e) => warn!(error = %e, "unparseable polar event acknowledged"),
    }
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use hmac::{Hmac, Mac};
    use serde_json::json;
    use sha2::Sha256;
    use tower::ServiceExt;

    use appforge_core::quota::QuotaTracker;

    use crate::http::handlers::testing::{ScriptedGateway, body_json, body_text, test_router};

    const SECRET: &str = "whsec_test";

    fn sign(body: &str, timestamp: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{body}").as_bytes());
        let digest = mac.finalize().into_bytes();
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        format!("t={timestamp},v1={hex}")
    }

    fn stripe_request(body: String, signature: Option<String>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/webhooks/stripe")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("stripe-signature", sig);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_allowed_event_acknowledged() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let body = json!({ "type": "customer.subscription.updated" }).to_string();
        let signature = sign(&body, "1700000000");
        let response = router
            .oneshot(stripe_request(body, Some(signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["received"], true);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_untracked_event_skipped() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let body = json!({ "type": "price.created" }).to_string();
        let signature = sign(&body, "1700000000");
        let response = router
            .oneshot(stripe_request(body, Some(signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["received"], true);
        assert_eq!(
            body["message"],
            "skipping untracked event type: price.created"
        );
    }

    #[tokio::test]
    async fn test_missing_signature_is_400() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let body = json!({ "type": "customer.updated" }).to_string();
        let response = router.oneshot(stripe_request(body, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tampered_body_is_400() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let signature = sign(
            &json!({ "type": "customer.updated" }).to_string(),
            "1700000000",
        );
        let tampered = json!({ "type": "customer.deleted" }).to_string();
        let response = router
            .oneshot(stripe_request(tampered, Some(signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_polar_acknowledges_unconditionally() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/webhooks/polar")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "type": "order.created" }).to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }
}
