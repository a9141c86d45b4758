use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use pesona_core::review::Review;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub listing_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub listing_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewIdParams {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub listing_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: String,
    pub approved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        ReviewResponse {
            id: r.id,
            listing_id: r.listing_id,
            user_id: r.user_id,
            rating: r.rating,
            comment: r.comment,
            approved: r.approved,
            created_at: r.created_at,
        }
    }
}

/// Public listing of approved reviews.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/reviews/list", get(list_approved))
}

/// Submission requires a user-scope session.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/reviews/submit", post(submit))
}

/// Moderation queue, admin scope only.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/reviews", get(list_pending))
        .route("/api/admin/reviews/approve", post(approve))
        .route("/api/admin/reviews/delete", delete(remove))
}

async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state
        .reviews
        .submit(req.listing_id, req.user_id, req.rating, req.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

async fn list_approved(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.reviews.list_approved(params.listing_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

async fn list_pending(State(state): State<AppState>) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.reviews.list_pending().await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

async fn approve(
    State(state): State<AppState>,
    Query(params): Query<ReviewIdParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.reviews.approve(params.id).await?;
    Ok(Json(serde_json::json!({ "message": "review approved" })))
}

async fn remove(
    State(state): State<AppState>,
    Query(params): Query<ReviewIdParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.reviews.delete(params.id).await?;
    Ok(Json(serde_json::json!({ "message": "review deleted" })))
}
