//! Authentication middleware that validates bearer tokens before protected handlers run.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState, Error,
    auth::{TokenKeys, validate_token},
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys used to verify tokens.
    pub token_keys: TokenKeys,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
        }
    }
}

/// Middleware function that checks for a valid `Authorization: Bearer <token>` header.
///
/// If the token is valid its [Claims](crate::auth::Claims) are placed into the
/// request extensions and the request is executed normally. Otherwise a 401
/// response is returned and the wrapped handler never sees the request.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(claims): Extension<Claims>` to receive the verified identity.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = match parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
    {
        Ok(header) => header,
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri);
            return Error::InvalidToken.into_response();
        }
    };

    let claims = match validate_token(bearer.token(), &state.token_keys) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(claims);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
