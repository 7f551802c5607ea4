// Browser-facing routes. Server-side rendering with Askama templates;
// every page is a plain form post, no client-side scripting.

pub mod admin;
pub mod templates;
pub mod user;

use askama::Template;
use axum::{
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::guard;
use crate::auth::sessions::SessionScope;
use crate::AppState;

pub use templates::*;

pub(crate) const DUPLICATE_EMAIL_MESSAGE: &str =
    "Email already exists! Please use a different email.";

// Helper to render templates and handle errors
pub(crate) fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, "template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

// Log an internal failure and answer with a bare 500
pub(crate) fn server_error(context: &str, err: impl std::fmt::Display) -> Response {
    error!(error = %err, "{}", context);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Open a session for a verified login and set the scope's cookie. A
/// login while already signed in replaces the previous session.
pub(crate) async fn start_session(
    state: &AppState,
    scope: SessionScope,
    user_id: &str,
    jar: CookieJar,
) -> Response {
    if let Some(stale) = jar.get(scope.cookie_name()).map(|c| c.value().to_string()) {
        if let Err(err) = state.sessions.destroy(scope, &stale).await {
            return server_error("failed to replace previous session", err);
        }
    }

    match state.sessions.open(scope, user_id).await {
        Ok(token) => {
            let cookie = Cookie::build((scope.cookie_name(), token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            (jar.add(cookie), Redirect::to(scope.home_route())).into_response()
        }
        Err(err) => server_error("failed to open session", err),
    }
}

/// Destroy the current session, clear the scope's cookie and land on
/// the given route.
pub(crate) async fn end_session(
    state: &AppState,
    scope: SessionScope,
    token: Option<&str>,
    jar: CookieJar,
    after: &str,
) -> Response {
    if let Some(token) = token {
        if let Err(err) = state.sessions.destroy(scope, token).await {
            return server_error("failed to destroy session", err);
        }
    }
    let removal = Cookie::build((scope.cookie_name(), "")).path("/").build();
    (jar.remove(removal), Redirect::to(after)).into_response()
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/", get(user::index))
        .route(
            "/register",
            get(user::register_page)
                .layer(middleware::from_fn_with_state(
                    SessionScope::User,
                    guard::require_anonymous,
                ))
                .post(user::register_submit),
        )
        .route(
            "/login",
            get(user::login_page)
                .layer(middleware::from_fn_with_state(
                    SessionScope::User,
                    guard::require_anonymous,
                ))
                .post(user::login_submit),
        )
        .route(
            "/home",
            get(user::home).layer(middleware::from_fn_with_state(
                SessionScope::User,
                guard::require_authenticated,
            )),
        )
        .route(
            "/edit",
            get(user::edit_page)
                .post(user::edit_submit)
                .layer(middleware::from_fn_with_state(
                    SessionScope::User,
                    guard::require_authenticated,
                )),
        )
        .route(
            "/logout",
            get(user::logout).layer(middleware::from_fn_with_state(
                SessionScope::User,
                guard::require_authenticated,
            )),
        )
        .layer(middleware::from_fn_with_state(
            (state.clone(), SessionScope::User),
            guard::resolve_session,
        ));

    let admin_routes = Router::new()
        .route(
            "/",
            get(admin::login_page)
                .layer(middleware::from_fn_with_state(
                    SessionScope::Admin,
                    guard::require_anonymous,
                ))
                .post(admin::login_submit),
        )
        .route("/login", get(admin::login_redirect))
        .route(
            "/home",
            get(admin::home).layer(middleware::from_fn_with_state(
                SessionScope::Admin,
                guard::require_authenticated,
            )),
        )
        .route(
            "/dashboard",
            get(admin::dashboard)
                .post(admin::search)
                .layer(middleware::from_fn_with_state(
                    SessionScope::Admin,
                    guard::require_authenticated,
                )),
        )
        .route(
            "/new-user",
            get(admin::new_user_page)
                .post(admin::new_user_submit)
                .layer(middleware::from_fn_with_state(
                    SessionScope::Admin,
                    guard::require_authenticated,
                )),
        )
        .route(
            "/user-edit",
            get(admin::edit_user_page)
                .post(admin::edit_user_submit)
                .layer(middleware::from_fn_with_state(
                    SessionScope::Admin,
                    guard::require_authenticated,
                )),
        )
        .route(
            "/user-delete",
            get(admin::delete_user).layer(middleware::from_fn_with_state(
                SessionScope::Admin,
                guard::require_authenticated,
            )),
        )
        .route(
            "/logout",
            get(admin::logout).layer(middleware::from_fn_with_state(
                SessionScope::Admin,
                guard::require_authenticated,
            )),
        )
        .layer(middleware::from_fn_with_state(
            (state.clone(), SessionScope::Admin),
            guard::resolve_session,
        ));

    Router::new()
        .merge(user_routes)
        .nest("/admin", admin_routes)
        .fallback(user::not_found)
        .layer(middleware::from_fn(guard::no_cache))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
