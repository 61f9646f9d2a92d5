/// Bearer authentication middleware
///
/// Validates the `Authorization: Bearer <access token>` header and inserts
/// the caller's [`AuthContext`] into the request extensions. Handlers read it
/// with `Extension<AuthContext>`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use taskflow_shared::auth::middleware::{authenticate_bearer, AuthContext};

use crate::{app::AppState, error::ApiError};

pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context: AuthContext = authenticate_bearer(auth_header, state.jwt_secret())?;

    tracing::Span::current().record("user_id", tracing::field::display(auth_context.user_id));
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
