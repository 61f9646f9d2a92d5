/// Authentication endpoints
///
/// - `POST /api/auth/signup` - Create an account and open a session
/// - `POST /api/auth/login` - Open a session
/// - `GET /api/auth/me` - Current user (bearer)
/// - `POST /api/auth/refresh` - New access token from the `rt` cookie
/// - `POST /api/auth/logout` - Revoke the refresh token (bearer)
///
/// Signup and login answer `{accessToken, user}` and set the refresh cookie:
///
/// ```text
/// Set-Cookie: rt=<96 hex chars>; HttpOnly; SameSite=Lax; Path=/api/auth; Max-Age=604800
/// ```
///
/// `Secure` is added in production. Refresh rotates the cookie; logout
/// clears it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidJson},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::user::PublicUser,
    service::{Refreshed, Session},
};
use validator::Validate;

/// Name of the refresh token cookie
pub const REFRESH_COOKIE: &str = "rt";

/// Path the refresh cookie is scoped to
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// Signup request
///
/// Missing fields deserialize as empty strings so the handler can answer
/// with a single "All fields required" message.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 254, message = "Email must be at most 254 characters"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(max = 254, message = "Email must be at most 254 characters"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: String,
}

/// `GET /me` response
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// Register a new account
///
/// # Errors
///
/// - `400`: missing field, malformed email, short password, email already registered
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .sessions
        .signup(&req.name, &req.email, &req.password, user_agent(&headers))
        .await?;

    session_response(&state, session)
}

/// Log in with email and password
///
/// # Errors
///
/// - `400`: missing field, or `Invalid credentials` for both unknown email
///   and wrong password
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .sessions
        .login(&req.email, &req.password, user_agent(&headers))
        .await?;

    session_response(&state, session)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = state.sessions.me(auth.user_id).await?;
    Ok(Json(MeResponse { user }))
}

/// Exchange the refresh cookie for a new access token
///
/// The presented token is consumed and a new one is set in its place.
///
/// # Errors
///
/// - `401`: no cookie, unknown, expired, or already used token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let raw = read_cookie(&headers, REFRESH_COOKIE);

    let Refreshed {
        access_token,
        refresh_token,
    } = state
        .sessions
        .refresh(raw.as_deref(), user_agent(&headers))
        .await?;

    let cookie = refresh_cookie(&state, &refresh_token)?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "accessToken": access_token })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let raw = read_cookie(&headers, REFRESH_COOKIE);
    state.sessions.logout(raw.as_deref()).await?;

    tracing::debug!(user_id = %auth.user_id, "Refresh cookie cleared");
    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_cookie(&state)?)]),
        Json(json!({ "ok": true })),
    ))
}

fn session_response(state: &AppState, session: Session) -> ApiResult<impl IntoResponse> {
    let cookie = refresh_cookie(state, &session.refresh_token)?;
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(session)))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// `Set-Cookie` value carrying a refresh token
pub fn refresh_cookie(state: &AppState, token: &str) -> ApiResult<HeaderValue> {
    cookie_value(
        token,
        state.config.auth.refresh_cookie_max_age_seconds,
        state.config.api.production,
    )
}

/// `Set-Cookie` value that deletes the refresh cookie
pub fn clear_cookie(state: &AppState) -> ApiResult<HeaderValue> {
    cookie_value("", 0, state.config.api.production)
}

fn cookie_value(token: &str, max_age: i64, secure: bool) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path={}; Max-Age={}",
        REFRESH_COOKIE, token, REFRESH_COOKIE_PATH, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie value: {}", e)))
}

/// Reads one cookie out of the `Cookie` request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_attributes() {
        let value = cookie_value("abc", 604800, false).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "rt=abc; HttpOnly; SameSite=Lax; Path=/api/auth; Max-Age=604800"
        );

        let secure = cookie_value("abc", 604800, true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; rt=deadbeef"));
        assert_eq!(read_cookie(&headers, "rt").as_deref(), Some("deadbeef"));
        assert_eq!(read_cookie(&headers, "missing"), None);

        let mut cleared = HeaderMap::new();
        cleared.insert(header::COOKIE, HeaderValue::from_static("rt="));
        assert_eq!(read_cookie(&cleared, "rt"), None);
    }

    #[test]
    fn test_signup_request_missing_fields_default_empty() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_password_rejected() {
        let req = LoginRequest {
            email: "a@b.co".to_string(),
            password: "x".repeat(129),
        };
        assert!(req.validate().is_err());
    }
}
