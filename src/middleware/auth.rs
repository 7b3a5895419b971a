use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use subtle::ConstantTimeEq;

use crate::auth::session;
use crate::error::SnowgateError;
use crate::router::SnowgateState;

/// Header carrying the shared device secret on upload requests.
pub const DEVICE_KEY_HEADER: &str = "x-api-key";

/// Ensure the inbound request carries the configured device key.
/// The comparison is constant-time; absence and mismatch are identical
/// failures with no side effects.
pub fn ensure_device_key(headers: &HeaderMap, expected: &str) -> Result<(), SnowgateError> {
    if let Some(supplied) = headers.get(DEVICE_KEY_HEADER).and_then(|v| v.to_str().ok())
        && bool::from(supplied.as_bytes().ct_eq(expected.as_bytes()))
    {
        return Ok(());
    }
    Err(SnowgateError::Unauthorized)
}

/// Extractor guard for device endpoints. Runs before the body is touched,
/// so an unauthorized upload is rejected without reading the multipart
/// payload.
#[derive(Debug, Clone, Copy)]
pub struct RequireDeviceKey;

impl<S> FromRequestParts<S> for RequireDeviceKey
where
    SnowgateState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SnowgateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = SnowgateState::from_ref(state);
        ensure_device_key(&parts.headers, &app.device_api_key)?;
        Ok(Self)
    }
}

/// Operator identity proven by the session cookie. API routes take this
/// extractor and reject anonymous callers with a structured 401 rather
/// than the login redirect the page routes use.
#[derive(Debug, Clone, Copy)]
pub struct OperatorSession(pub i64);

impl<S> FromRequestParts<S> for OperatorSession
where
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SnowgateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| SnowgateError::Unauthorized)?;
        session::current_operator(&jar)
            .map(Self)
            .ok_or(SnowgateError::Unauthorized)
    }
}
