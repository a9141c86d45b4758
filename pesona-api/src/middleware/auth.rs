use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use pesona_session::Scope;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve a user-scope session from its cookie and inject it into the
/// request. Admin credentials do not pass here; scopes are independent.
pub async fn require_user_scope(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = state.sessions.current_session(&jar, Scope::User)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Same as [`require_user_scope`] but for the admin cookie namespace.
pub async fn require_admin_scope(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = state.sessions.current_session(&jar, Scope::Admin)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
