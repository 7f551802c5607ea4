// Askama template definitions

use askama::Template;

use crate::db::User;

// Registration form
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub message: Option<String>,
}

// Member login form
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub message: Option<String>,
}

// Member landing page
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: User,
}

// Self-service profile edit form, prefilled
#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditProfileTemplate {
    pub message: Option<String>,
    pub name: String,
    pub email: String,
    pub contact: String,
}

// Admin login form
#[derive(Template)]
#[template(path = "admin_login.html")]
pub struct AdminLoginTemplate {
    pub message: Option<String>,
}

// Admin landing page
#[derive(Template)]
#[template(path = "admin_home.html")]
pub struct AdminHomeTemplate {
    pub admin: User,
}

// Roster table with search; `message` carries the empty-search notice
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub users: Vec<User>,
    pub message: Option<String>,
}

// Admin form for adding a member
#[derive(Template)]
#[template(path = "new_user.html")]
pub struct NewUserTemplate {
    pub message: Option<String>,
}

// Admin form for editing a member record
#[derive(Template)]
#[template(path = "user_edit.html")]
pub struct UserEditTemplate {
    pub message: Option<String>,
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
}

// Fallback page for unknown routes
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;
