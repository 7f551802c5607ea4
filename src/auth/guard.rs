//! Request guards for the browser-facing routes.
//!
//! `resolve_session` runs once per scope: it reads the scope's cookie,
//! looks the token up in the session store, and stashes the outcome in
//! request extensions as a [`SessionContext`]. The per-route guards
//! (`require_authenticated`, `require_anonymous`) only inspect that
//! context and redirect; they never touch the database.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::error;

use crate::auth::sessions::SessionScope;
use crate::AppState;

/// Outcome of session resolution for one request.
///
/// `token` is the raw cookie value (present even when it no longer
/// resolves, so logout can still clear it); `user_id` is set only when
/// the token matched a live session in the right scope.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl SessionContext {
    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Mark every response uncacheable so the back button cannot resurrect
/// a signed-in page after logout.
pub async fn no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::EXPIRES, HeaderValue::from_static("-1"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

/// Resolve the scope's session cookie and attach a [`SessionContext`].
pub async fn resolve_session(
    State((state, scope)): State<(Arc<AppState>, SessionScope)>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(scope.cookie_name())
        .map(|c| c.value().to_string());

    let user_id = match &token {
        Some(token) => match state.sessions.resolve(scope, token).await {
            Ok(user_id) => user_id,
            Err(err) => {
                error!(error = %err, scope = scope.as_str(), "session lookup failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .into_response();
            }
        },
        None => None,
    };

    request
        .extensions_mut()
        .insert(SessionContext { token, user_id });
    next.run(request).await
}

/// Let only signed-in visitors through; everyone else goes to the
/// scope's login page.
pub async fn require_authenticated(
    State(scope): State<SessionScope>,
    request: Request,
    next: Next,
) -> Response {
    if signed_in(&request) {
        next.run(request).await
    } else {
        Redirect::to(scope.login_route()).into_response()
    }
}

/// Keep signed-in visitors away from login and registration pages by
/// bouncing them to the scope's home.
pub async fn require_anonymous(
    State(scope): State<SessionScope>,
    request: Request,
    next: Next,
) -> Response {
    if signed_in(&request) {
        Redirect::to(scope.home_route()).into_response()
    } else {
        next.run(request).await
    }
}

fn signed_in(request: &Request) -> bool {
    request
        .extensions()
        .get::<SessionContext>()
        .map(SessionContext::is_signed_in)
        .unwrap_or(false)
}
