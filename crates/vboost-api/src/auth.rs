//! Optional bearer authentication.
//!
//! Uploads never require a principal: a missing, malformed, or rejected
//! token all resolve to an anonymous caller.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use tracing::{debug, warn};

use vboost_metadata::{Principal, PrincipalResolver};

/// Bearer token from the `Authorization` header, if well-formed.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self(token))
    }
}

/// Resolve the caller; resolution failures are logged and treated as anonymous.
pub async fn resolve_principal(
    resolver: &dyn PrincipalResolver,
    token: Option<&str>,
) -> Option<Principal> {
    let token = token?;

    match resolver.resolve(token).await {
        Ok(Some(principal)) => {
            debug!(user_id = %principal.user_id, "Resolved principal");
            Some(principal)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, backend = resolver.backend_name(), "Principal resolution failed, continuing anonymously");
            None
        }
    }
}
