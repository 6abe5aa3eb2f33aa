use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use shared_models::error::AppError;
use shared_config::AppConfig;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Gate for the admin routes: a single shared password sent in
/// `X-Admin-Password`.
pub async fn admin_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let supplied = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .ok_or_else(|| AppError::Auth("Missing admin password header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid admin password header format".to_string()))?;

    if !password_matches(supplied, &config.admin_password) {
        warn!("Rejected admin request with wrong password");
        return Err(AppError::Auth("Contraseña incorrecta".to_string()));
    }

    Ok(next.run(request).await)
}

/// Compares fixed-length digests so the comparison time does not depend on
/// the length of the common prefix.
pub fn password_matches(supplied: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let supplied = Sha256::digest(supplied.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    supplied
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
