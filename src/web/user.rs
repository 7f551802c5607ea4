//! Member-facing pages: registration, login, home and self-service
//! profile editing.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::accounts::AccountError;
use crate::auth::guard::SessionContext;
use crate::auth::sessions::SessionScope;
use crate::web::templates::{
    EditProfileTemplate, HomeTemplate, LoginTemplate, NotFoundTemplate, RegisterTemplate,
};
use crate::web::{end_session, render_template, server_error, start_session, DUPLICATE_EMAIL_MESSAGE};
use crate::AppState;

// Landing page just forwards to the login form
pub async fn index() -> Redirect {
    Redirect::to("/login")
}

pub async fn register_page() -> Response {
    render_template(RegisterTemplate { message: None })
}

#[derive(Deserialize)]
pub struct RegisterForm {
    name: String,
    email: String,
    contact: String,
    password: String,
}

pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match state
        .accounts
        .register(&form.name, &form.email, &form.contact, &form.password)
        .await
    {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(AccountError::DuplicateEmail) => render_template(RegisterTemplate {
            message: Some(DUPLICATE_EMAIL_MESSAGE.to_string()),
        }),
        Err(AccountError::Validation(reason)) => {
            debug!(reason, "registration rejected");
            render_template(RegisterTemplate {
                message: Some("An error occurred during registration.".to_string()),
            })
        }
        Err(AccountError::Store(err)) => {
            error!(error = %err, "registration failed");
            render_template(RegisterTemplate {
                message: Some("An error occurred during registration.".to_string()),
            })
        }
        Err(err) => server_error("registration failed", err),
    }
}

pub async fn login_page() -> Response {
    render_template(LoginTemplate { message: None })
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state
        .accounts
        .verify_credentials(&form.email, &form.password, false)
        .await
    {
        Ok(user) => start_session(&state, SessionScope::User, &user.id, jar).await,
        Err(AccountError::NotFound) => render_template(LoginTemplate {
            message: Some("No user found with this email address.".to_string()),
        }),
        Err(AccountError::WrongPassword) => render_template(LoginTemplate {
            message: Some("Incorrect password. Please try again.".to_string()),
        }),
        Err(err) => server_error("login failed", err),
    }
}

pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let Some(user_id) = session.user_id.as_deref() else {
        return Redirect::to("/login").into_response();
    };
    match state.accounts.find(user_id).await {
        Ok(Some(user)) => render_template(HomeTemplate { user }),
        // the record behind this session is gone; send them back to login
        Ok(None) => Redirect::to("/login").into_response(),
        Err(err) => server_error("failed to load profile", err),
    }
}

pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let Some(user_id) = session.user_id.as_deref() else {
        return Redirect::to("/login").into_response();
    };
    match state.accounts.find(user_id).await {
        Ok(Some(user)) => render_template(EditProfileTemplate {
            message: None,
            name: user.name,
            email: user.email,
            contact: user.contact,
        }),
        Ok(None) => Redirect::to("/login").into_response(),
        Err(err) => server_error("failed to load profile", err),
    }
}

#[derive(Deserialize)]
pub struct EditProfileForm {
    name: String,
    email: String,
    contact: String,
}

/// Apply a self-service edit. The record is always the one behind the
/// session; the form carries no id to tamper with.
pub async fn edit_submit(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<EditProfileForm>,
) -> Response {
    let Some(user_id) = session.user_id.as_deref() else {
        return Redirect::to("/login").into_response();
    };
    match state
        .accounts
        .update_profile(user_id, &form.name, &form.email, &form.contact)
        .await
    {
        Ok(_) => Redirect::to("/home").into_response(),
        Err(AccountError::DuplicateEmail) => render_template(EditProfileTemplate {
            message: Some(DUPLICATE_EMAIL_MESSAGE.to_string()),
            name: form.name,
            email: form.email,
            contact: form.contact,
        }),
        Err(AccountError::NotFound) => render_template(EditProfileTemplate {
            message: Some("Error occurred during the update.".to_string()),
            name: form.name,
            email: form.email,
            contact: form.contact,
        }),
        Err(AccountError::Store(err)) => {
            error!(error = %err, "profile update failed");
            render_template(EditProfileTemplate {
                message: Some("An error occurred during the update.".to_string()),
                name: form.name,
                email: form.email,
                contact: form.contact,
            })
        }
        Err(err) => server_error("profile update failed", err),
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
) -> Response {
    end_session(&state, SessionScope::User, session.token.as_deref(), jar, "/").await
}

// Catch-all for unknown paths
pub async fn not_found() -> Response {
    match NotFoundTemplate.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(err) => server_error("failed to render 404 page", err),
    }
}
