//! Verifies the queue service's signature on `/worker` callbacks before the
//! handler runs, so the endpoint cannot be invoked directly by a caller who
//! doesn't hold the shared signing key.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-queue-signature";

pub async fn verify_queue_signature(
    State(signing_key): State<String>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(AppError::InvalidSignature)?;

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|_| AppError::BadRequest("unreadable request body".to_string()))?;

    verify(&signing_key, &bytes, &signature)?;

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

fn verify(signing_key: &str, body: &Bytes, signature_hex: &str) -> Result<(), AppError> {
    let signature = hex_decode(signature_hex).ok_or(AppError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|_| AppError::Configuration("invalid QUEUE_SIGNING_KEY".to_string()))?;
    mac.update(body);
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidSignature)
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
