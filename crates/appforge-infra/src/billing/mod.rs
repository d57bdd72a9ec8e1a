//! Payment-webhook signature verification.
//!
//! Stripe signs webhook deliveries with a `stripe-signature` header of
//! the form `t=<unix-ts>,v1=<hex>[,v1=<hex>..]`; the signed payload is
//! `"{t}.{raw body}"` and the scheme is HMAC-SHA256 with the endpoint's
//! signing secret. Verification is constant-time via the hmac crate.
//!
//! Subscription state handling lives with the payment provider; this
//! module only authenticates deliveries and gates the event allowlist.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use appforge_types::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Stripe event types the webhook acknowledges with processing.
///
/// Everything else is acknowledged and skipped.
pub const ALLOWED_STRIPE_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "customer.subscription.created",
    "customer.subscription.updated",
    "customer.subscription.deleted",
    "customer.subscription.paused",
    "customer.subscription.resumed",
    "customer.subscription.pending_update_applied",
    "customer.subscription.pending_update_expired",
    "customer.subscription.trial_will_end",
    "invoice.paid",
    "invoice.payment_failed",
    "invoice.payment_action_required",
    "invoice.upcoming",
    "invoice.marked_uncollectible",
    "invoice.payment_succeeded",
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "payment_intent.canceled",
];

/// Whether an event type is in the processing allowlist.
pub fn is_allowed_event(event_type: &str) -> bool {
    ALLOWED_STRIPE_EVENTS.contains(&event_type)
}

/// Verify a Stripe-style signature header against a raw request body.
///
/// Accepts the signature if any `v1` entry in the header matches the
/// HMAC-SHA256 of `"{t}.{body}"` under `secret`.
pub fn verify_stripe_signature(
    secret: &[u8],
    body: &[u8],
    header: &str,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| WebhookError::MalformedSignature("missing 't' field".to_string()))?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedSignature(
            "missing 'v1' field".to_string(),
        ));
    }

    // Signed payload is "{t}.{body}".
    let mut signed_payload = Vec::with_capacity(timestamp.len() + 1 + body.len());
    signed_payload.extend_from_slice(timestamp.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(body);

    for signature_hex in signatures {
        let Ok(expected) = hex_decode(signature_hex) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| WebhookError::InvalidKey(e.to_string()))?;
        mac.update(&signed_payload);
        // Constant-time comparison via the hmac crate.
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(WebhookError::VerificationFailed)
}

fn hex_decode(s: &str) -> Result<Vec<u8>, ()> {
    if s.len() % 2 != 0 {
        return Err(());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
        .collect()
}
