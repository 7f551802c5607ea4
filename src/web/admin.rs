//! Admin dashboard: roster listing, name search, and add/edit/delete
//! of member records. Everything here sits behind the admin session
//! scope; regular member cookies do not open these pages.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::accounts::AccountError;
use crate::auth::guard::SessionContext;
use crate::auth::sessions::SessionScope;
use crate::web::templates::{
    AdminHomeTemplate, AdminLoginTemplate, DashboardTemplate, NewUserTemplate, UserEditTemplate,
};
use crate::web::{end_session, render_template, server_error, start_session, DUPLICATE_EMAIL_MESSAGE};
use crate::AppState;

pub async fn login_page() -> Response {
    render_template(AdminLoginTemplate { message: None })
}

// The old /admin/login path stays reachable and forwards to /admin
pub async fn login_redirect() -> Redirect {
    Redirect::to("/admin")
}

#[derive(Deserialize)]
pub struct AdminLoginForm {
    email: String,
    password: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<AdminLoginForm>,
) -> Response {
    match state
        .accounts
        .verify_credentials(&form.email, &form.password, true)
        .await
    {
        Ok(admin) => start_session(&state, SessionScope::Admin, &admin.id, jar).await,
        Err(AccountError::NotFound) => render_template(AdminLoginTemplate {
            message: Some("Invalid User".to_string()),
        }),
        Err(AccountError::WrongPassword) => render_template(AdminLoginTemplate {
            message: Some("Invalid Password".to_string()),
        }),
        Err(AccountError::NotAdmin) => render_template(AdminLoginTemplate {
            message: Some("Invalid admin".to_string()),
        }),
        Err(err) => server_error("admin login failed", err),
    }
}

pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let Some(user_id) = session.user_id.as_deref() else {
        return Redirect::to("/admin").into_response();
    };
    match state.accounts.find(user_id).await {
        Ok(Some(admin)) => render_template(AdminHomeTemplate { admin }),
        Ok(None) => Redirect::to("/admin").into_response(),
        Err(err) => server_error("failed to load admin home", err),
    }
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    match state.accounts.list().await {
        Ok(users) => render_template(DashboardTemplate {
            users,
            message: None,
        }),
        Err(err) => server_error("failed to load dashboard", err),
    }
}

#[derive(Deserialize)]
pub struct SearchForm {
    search: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Response {
    match state.accounts.search(&form.search).await {
        Ok(users) if users.is_empty() => render_template(DashboardTemplate {
            users,
            message: Some("No user found".to_string()),
        }),
        Ok(users) => render_template(DashboardTemplate {
            users,
            message: None,
        }),
        Err(err) => server_error("user search failed", err),
    }
}

pub async fn new_user_page() -> Response {
    render_template(NewUserTemplate { message: None })
}

#[derive(Deserialize)]
pub struct NewUserForm {
    name: String,
    email: String,
    contact: String,
    password: String,
}

pub async fn new_user_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewUserForm>,
) -> Response {
    match state
        .accounts
        .register(&form.name, &form.email, &form.contact, &form.password)
        .await
    {
        Ok(_) => Redirect::to("/admin/dashboard").into_response(),
        Err(AccountError::DuplicateEmail) => render_template(NewUserTemplate {
            message: Some(DUPLICATE_EMAIL_MESSAGE.to_string()),
        }),
        Err(AccountError::Validation(_)) => render_template(NewUserTemplate {
            message: Some("An error occurred while processing your request.".to_string()),
        }),
        Err(AccountError::Store(err)) => {
            error!(error = %err, "failed to add user");
            render_template(NewUserTemplate {
                message: Some("An error occurred while processing your request.".to_string()),
            })
        }
        Err(err) => server_error("failed to add user", err),
    }
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    id: Option<String>,
}

pub async fn edit_user_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Response {
    let Some(id) = query.id else {
        return Redirect::to("/admin/dashboard").into_response();
    };
    match state.accounts.find(&id).await {
        Ok(Some(user)) => render_template(UserEditTemplate {
            message: None,
            id: user.id,
            name: user.name,
            email: user.email,
            contact: user.contact,
        }),
        // stale link, probably deleted in another tab
        Ok(None) => Redirect::to("/admin/dashboard").into_response(),
        Err(err) => server_error("failed to load user", err),
    }
}

#[derive(Deserialize)]
pub struct EditUserForm {
    id: String,
    name: String,
    email: String,
    contact: String,
}

pub async fn edit_user_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<EditUserForm>,
) -> Response {
    match state
        .accounts
        .update_profile(&form.id, &form.name, &form.email, &form.contact)
        .await
    {
        Ok(_) => Redirect::to("/admin/dashboard").into_response(),
        Err(AccountError::DuplicateEmail) => render_template(UserEditTemplate {
            message: Some(DUPLICATE_EMAIL_MESSAGE.to_string()),
            id: form.id,
            name: form.name,
            email: form.email,
            contact: form.contact,
        }),
        Err(AccountError::NotFound) => render_template(UserEditTemplate {
            message: Some("Error occurred during the update.".to_string()),
            id: form.id,
            name: form.name,
            email: form.email,
            contact: form.contact,
        }),
        Err(AccountError::Store(err)) => {
            error!(error = %err, "user update failed");
            render_template(UserEditTemplate {
                message: Some("An error occurred during the update.".to_string()),
                id: form.id,
                name: form.name,
                email: form.email,
                contact: form.contact,
            })
        }
        Err(err) => server_error("user update failed", err),
    }
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Response {
    let Some(id) = query.id else {
        return Redirect::to("/admin/dashboard").into_response();
    };
    match state.accounts.delete(&id).await {
        Ok(()) => Redirect::to("/admin/dashboard").into_response(),
        Err(err) => server_error("failed to delete user", err),
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
) -> Response {
    end_session(
        &state,
        SessionScope::Admin,
        session.token.as_deref(),
        jar,
        "/admin",
    )
    .await
}
