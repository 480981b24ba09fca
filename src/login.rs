use crate::app::AppState;
use crate::error::AppError;
use crate::templates::{LOGIN, LoginPage};
use axum::{
    Form,
    extract::{Query, Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Authenticated/unauthenticated flag shared by the whole process
///
/// There is no user identity behind it: logging in from one browser logs
/// every visitor in until someone logs out.
#[derive(Debug, Default)]
pub struct SessionGate {
    authenticated: AtomicBool,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self) {
        self.authenticated.store(true, Ordering::SeqCst);
    }

    pub fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}

/// Login form fields
///
/// Both are required to be non-empty but neither is checked against anything.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Serve the login page HTML
pub async fn serve_login_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoginQuery>,
) -> Result<Html<String>, AppError> {
    let error = params
        .error
        .as_deref()
        .map(|_| "Enter a username and password to continue.");
    let page = state.templates.render(LOGIN, &LoginPage { error })?;
    Ok(Html(page))
}

/// Handle login form submissions
///
/// Any non-empty username and password opens the gate and redirects to the
/// dashboard. Empty fields send the visitor back to the form.
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Form(credentials): Form<UserCredentials>,
) -> Redirect {
    if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
        debug!("login rejected, empty credentials");
        return Redirect::to("/?error=missing");
    }

    state.session.login();
    info!(username = %credentials.username, "logged in");
    Redirect::to("/dashboard")
}

/// Handle logout
///
/// Closes the gate, drops the loaded records and redirects to the login page.
pub async fn handle_logout(State(state): State<Arc<AppState>>) -> Redirect {
    state.session.logout();
    state.dashboard.reset();
    info!("logged out");
    Redirect::to("/")
}

/// Authentication middleware
///
/// Passes the request through when the gate is open, otherwise redirects
/// to the login page.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.session.is_authenticated() {
        return next.run(request).await;
    }

    debug!(path = %request.uri().path(), "unauthenticated, redirecting to login");
    Redirect::to("/").into_response()
}
