use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use pesona_core::user::User;
use pesona_core::CoreError;
use pesona_session::authority::RegisterInput;
use pesona_session::Scope;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/register", post(register))
        .route("/api/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, _session, cookie) = state
        .sessions
        .authenticate(state.users.as_ref(), &req.username, &req.password)
        .await?;

    Ok((jar.add(cookie), Json(UserResponse::from(user))))
}

/// Logout clears both scope cookies; a browser may hold either.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .add(state.sessions.removal_cookie(Scope::Admin))
        .add(state.sessions.removal_cookie(Scope::User));

    (jar, Json(serde_json::json!({ "message": "logged out" })))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .sessions
        .register(
            state.users.as_ref(),
            RegisterInput {
                username: req.username,
                email: req.email,
                password: req.password,
                full_name: req.full_name,
                phone: req.phone,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Profile for whichever scope authenticates, admin checked first.
async fn me(State(state): State<AppState>, jar: CookieJar) -> Result<Json<UserResponse>, ApiError> {
    let session = state.sessions.current_session_either(&jar)?;

    let user = state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or(CoreError::NotFound("user"))?;

    Ok(Json(UserResponse::from(user)))
}
