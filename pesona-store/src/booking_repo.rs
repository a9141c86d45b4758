use async_trait::async_trait;
use sqlx::PgPool;

use pesona_core::booking::{Booking, BookingStatus, NewBooking};
use pesona_core::repository::{BookingRepository, TransitionOutcome};
use pesona_core::CoreError;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "id, booking_code, listing_id, user_id, visit_date, quantity, \
                               unit_price, total_price, status, payment_method, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    booking_code: String,
    listing_id: i64,
    user_id: i64,
    visit_date: chrono::NaiveDate,
    quantity: i32,
    unit_price: i64,
    total_price: i64,
    status: String,
    payment_method: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, CoreError> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| CoreError::persistence(format!("unknown booking status '{}'", self.status)))?;

        Ok(Booking {
            id: self.id,
            booking_code: self.booking_code,
            listing_id: self.listing_id,
            user_id: self.user_id,
            visit_date: self.visit_date,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
            status,
            payment_method: self.payment_method,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn status_strings(statuses: &[BookingStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, CoreError> {
        let sql = format!(
            "INSERT INTO bookings \
             (booking_code, listing_id, user_id, visit_date, quantity, unit_price, total_price, status, payment_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8) \
             RETURNING {BOOKING_COLUMNS}"
        );

        let row: BookingRow = sqlx::query_as(&sql)
            .bind(&booking.booking_code)
            .bind(booking.listing_id)
            .bind(booking.user_id)
            .bind(booking.visit_date)
            .bind(booking.quantity)
            .bind(booking.unit_price)
            .bind(booking.total_price)
            .bind(&booking.payment_method)
            .fetch_one(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        row.into_booking()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, CoreError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_code = $1");

        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, CoreError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );

        let rows: Vec<BookingRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn list_all(&self) -> Result<Vec<Booking>, CoreError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id DESC");

        let rows: Vec<BookingRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn transition(
        &self,
        code: &str,
        expected: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<TransitionOutcome, CoreError> {
        // Single conditional update: the guard and the write are one
        // statement, so racing transitions serialize in the store and
        // exactly one of them matches the row.
        let sql = format!(
            "UPDATE bookings SET status = $1, updated_at = NOW() \
             WHERE booking_code = $2 AND status = ANY($3) \
             RETURNING {BOOKING_COLUMNS}"
        );

        let updated: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(to.as_str())
            .bind(code)
            .bind(status_strings(expected))
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        if let Some(row) = updated {
            return Ok(TransitionOutcome::Applied(row.into_booking()?));
        }

        // The guard did not match; report why.
        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM bookings WHERE booking_code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(CoreError::persistence)?;

        match current {
            Some((status,)) => {
                let status = BookingStatus::parse(&status)
                    .ok_or_else(|| CoreError::persistence(format!("unknown booking status '{status}'")))?;
                Ok(TransitionOutcome::StatusMismatch(status))
            }
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    async fn exists_with_status(
        &self,
        user_id: i64,
        listing_id: i64,
        statuses: &[BookingStatus],
    ) -> Result<bool, CoreError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
               SELECT 1 FROM bookings \
               WHERE user_id = $1 AND listing_id = $2 AND status = ANY($3))",
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(status_strings(statuses))
        .fetch_one(&self.pool)
        .await
        .map_err(CoreError::persistence)?;

        Ok(exists)
    }
}
