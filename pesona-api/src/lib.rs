use axum::{http::Method, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod error;
pub mod middleware;
pub mod reviews;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // Cookie-based sessions need credentialed CORS, so the origin is
    // mirrored instead of wildcarded.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ]);

    let public = Router::new()
        .merge(auth::routes())
        .merge(reviews::public_routes());

    let user_scoped = Router::new()
        .merge(bookings::routes())
        .merge(reviews::user_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_scope,
        ));

    let admin_scoped = Router::new()
        .merge(bookings::admin_routes())
        .merge(reviews::admin_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin_scope,
        ));

    Router::new()
        .merge(public)
        .merge(user_scoped)
        .merge(admin_scoped)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
