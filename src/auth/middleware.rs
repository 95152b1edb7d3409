use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::{AuthError, TokenVerifier};

/// Pull the token out of `Authorization: Bearer <token>`.
/// `Ok(None)` means the header was absent.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedHeader)?;
    Ok(Some(token))
}

/// Upstream authentication layer for HTTP routes: attaches an
/// [`AuthUser`](super::AuthUser) to the request when the bearer token
/// verifies. It never rejects; handlers decide what "no identity" means.
pub async fn attach_auth(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    match bearer_token(request.headers()) {
        Ok(Some(token)) => match verifier.verify(token) {
            Ok(user) => {
                debug!(uid = %user.uid, "Attached caller identity");
                request.extensions_mut().insert(user);
            }
            Err(e) => warn!(error = %e, "Bearer token rejected"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Ignoring Authorization header"),
    }

    next.run(request).await
}
