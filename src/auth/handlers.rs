use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::auth::identity::IdentityError;
use crate::auth::session;
use crate::db::models::{Role, User};
use crate::db::users::{self, NewUser};
use crate::error::{AppError, AppResult};
use crate::extractors::{session_token, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub access_token: String,
    /// Role the client asks for; admin is only granted to allowlisted emails
    #[serde(default)]
    pub role: Option<Role>,
}

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

/// Sign in with a Google access token obtained by the client.
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> AppResult<Response> {
    let access_token = req.access_token.trim();
    if access_token.is_empty() {
        return Err(AppError::BadRequest("accessToken is required".into()));
    }

    let identity = state
        .identity
        .fetch_identity(access_token)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidToken | IdentityError::MissingEmail => AppError::Unauthorized,
            other => AppError::Internal(other.to_string()),
        })?;

    let allowlisted = state.config.auth.is_admin_email(&identity.email);
    let requested = req.role.unwrap_or(Role::User);
    if requested == Role::Admin && !allowlisted {
        tracing::warn!("Admin sign-in refused for {}", identity.email);
        return Err(AppError::Forbidden(
            "You are not authorized to access the admin panel.".into(),
        ));
    }

    let conn = state.db.get()?;
    let mut user: User = users::ensure_user(
        &conn,
        &NewUser {
            name: identity.name,
            email: identity.email,
            picture: identity.picture,
        },
        requested,
    )?;

    if requested == Role::Admin && user.role != Role::Admin {
        users::set_role(&conn, &user.uid, Role::Admin)?;
        user.role = Role::Admin;
    }

    let token = session::create_session(&conn, &user.uid, state.config.auth.session_hours)?;
    tracing::info!("{} signed in as {}", user.email, user.role.as_str());

    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(user)).into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = session_token(&headers, cookie_name) {
        let conn = state.db.get()?;
        session::delete_session(&conn, token)?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(cookie_name))],
    )
        .into_response())
}

pub async fn me(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<User>> {
    let conn = state.db.get()?;
    users::find_by_uid(&conn, &user.uid)?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}
