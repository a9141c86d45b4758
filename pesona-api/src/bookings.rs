use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pesona_booking::CreateBooking;
use pesona_core::booking::Booking;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub listing_id: i64,
    pub user_id: i64,
    /// ISO-8601 date, e.g. "2026-01-15".
    pub visit_date: NaiveDate,
    pub quantity: i32,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    pub booking_id: i64,
    pub booking_code: String,
    pub final_price: i64,
}

#[derive(Debug, Deserialize)]
pub struct BookingCodeRequest {
    pub booking_code: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: i64,
    pub booking_code: String,
    pub listing_id: i64,
    pub user_id: i64,
    pub visit_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub status: String,
    pub payment_method: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        BookingResponse {
            id: b.id,
            booking_code: b.booking_code,
            listing_id: b.listing_id,
            user_id: b.user_id,
            visit_date: b.visit_date,
            quantity: b.quantity,
            unit_price: b.unit_price,
            total_price: b.total_price,
            status: b.status.to_string(),
            payment_method: b.payment_method,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Routes requiring a user-scope session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/booking/create", post(create))
        .route("/api/booking/pay", post(pay))
        .route("/api/booking/cancel", post(cancel))
        .route("/api/booking/history", get(history))
        .route("/api/booking/detail", get(detail))
}

/// Admin overview route, mounted behind the admin-scope middleware.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/bookings", get(list_all))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .ledger
        .create(CreateBooking {
            listing_id: req.listing_id,
            user_id: req.user_id,
            visit_date: req.visit_date,
            quantity: req.quantity,
            payment_method: req.payment_method,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            booking_id: booking.id,
            booking_code: booking.booking_code,
            final_price: booking.total_price,
        }),
    ))
}

async fn pay(
    State(state): State<AppState>,
    Json(req): Json<BookingCodeRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state.ledger.mark_paid(&req.booking_code).await?;
    Ok(Json(booking.into()))
}

async fn cancel(
    State(state): State<AppState>,
    Json(req): Json<BookingCodeRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state.ledger.cancel(&req.booking_code).await?;
    Ok(Json(booking.into()))
}

async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.ledger.history(params.user_id).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

async fn detail(
    State(state): State<AppState>,
    Query(params): Query<DetailParams>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state.ledger.detail(&params.code).await?;
    Ok(Json(booking.into()))
}

async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.ledger.list_all().await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}
