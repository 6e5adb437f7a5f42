//! Authentication middleware and sign-in endpoints

use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{MeResponse, SignInRequest, SignInResponse};
use crate::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "mc_session";

/// Authenticated user stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Auth middleware - resolves the session token from the cookie or a Bearer header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = session_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing session".to_string()))?;

    let user = state
        .db
        .get_user_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

/// Session token from the `mc_session` cookie, falling back to `Authorization: Bearer`
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE).path("/").build();
    cookie.make_removal();
    cookie
}

/// POST /api/auth/sign-in
/// Upserts the user by email and opens a session
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse> {
    let email = payload
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| e.contains('@'))
        .ok_or_else(|| ApiError::BadRequest("A valid email is required".to_string()))?;

    let user = state.db.upsert_user(&email).await?;
    let token = state.db.create_auth_session(user.id).await?;

    tracing::info!("User {} signed in", user.id);

    let jar = jar.add(session_cookie(token.clone(), state.config.secure_cookies));
    Ok((jar, Json(SignInResponse { user, token })))
}

/// POST /api/auth/sign-out
/// Drops the session (if any) and expires the cookie
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        state.db.delete_auth_session(&token).await?;
    }

    Ok((
        jar.add(removal_cookie()),
        Json(serde_json::json!({ "ok": true })),
    ))
}

/// GET /api/auth/me
pub async fn me(Extension(auth): Extension<AuthenticatedUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth.user_id,
        email: auth.email,
    })
}
