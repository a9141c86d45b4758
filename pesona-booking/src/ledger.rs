use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use pesona_core::booking::{Booking, BookingStatus, NewBooking};
use pesona_core::repository::{BookingRepository, ListingRepository, TransitionOutcome};
use pesona_core::CoreError;

use crate::code;

#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub listing_id: i64,
    pub user_id: i64,
    pub visit_date: NaiveDate,
    pub quantity: i32,
    pub payment_method: String,
}

/// Booking lifecycle engine: creation with a price snapshot, and status
/// transitions expressed as conditional updates against the store.
pub struct BookingLedger {
    bookings: Arc<dyn BookingRepository>,
    listings: Arc<dyn ListingRepository>,
}

impl BookingLedger {
    pub fn new(bookings: Arc<dyn BookingRepository>, listings: Arc<dyn ListingRepository>) -> Self {
        Self { bookings, listings }
    }

    /// Create a pending booking. The listing price is read once here and
    /// snapshotted; the total is exact integer arithmetic and never
    /// recomputed afterwards.
    pub async fn create(&self, req: CreateBooking) -> Result<Booking, CoreError> {
        if req.quantity < 1 {
            return Err(CoreError::validation("quantity must be a positive integer"));
        }

        let unit_price = self
            .listings
            .unit_price(req.listing_id)
            .await?
            .ok_or(CoreError::NotFound("listing"))?;

        let total_price = unit_price
            .checked_mul(req.quantity as i64)
            .ok_or_else(|| CoreError::validation("total price out of range"))?;

        let booking = self
            .bookings
            .insert(NewBooking {
                booking_code: code::generate(),
                listing_id: req.listing_id,
                user_id: req.user_id,
                visit_date: req.visit_date,
                quantity: req.quantity,
                unit_price,
                total_price,
                payment_method: req.payment_method,
            })
            .await?;

        info!(
            code = %booking.booking_code,
            listing_id = booking.listing_id,
            user_id = booking.user_id,
            total = booking.total_price,
            "booking created"
        );

        Ok(booking)
    }

    /// Settle payment for a booking. Re-paying an already paid booking is
    /// accepted; a cancelled or completed booking is not, so a racing
    /// cancel cannot be overwritten.
    pub async fn mark_paid(&self, booking_code: &str) -> Result<Booking, CoreError> {
        let outcome = self
            .bookings
            .transition(
                booking_code,
                &[BookingStatus::Pending, BookingStatus::Paid],
                BookingStatus::Paid,
            )
            .await?;

        match outcome {
            TransitionOutcome::Applied(booking) => {
                info!(code = %booking.booking_code, "booking paid");
                Ok(booking)
            }
            TransitionOutcome::StatusMismatch(status) => Err(CoreError::InvalidTransition(
                format!("cannot pay a {status} order"),
            )),
            TransitionOutcome::NotFound => Err(CoreError::NotFound("booking")),
        }
    }

    /// Cancel a booking; legal only while it is still pending.
    pub async fn cancel(&self, booking_code: &str) -> Result<Booking, CoreError> {
        let outcome = self
            .bookings
            .transition(
                booking_code,
                &[BookingStatus::Pending],
                BookingStatus::Cancelled,
            )
            .await?;

        match outcome {
            TransitionOutcome::Applied(booking) => {
                info!(code = %booking.booking_code, "booking cancelled");
                Ok(booking)
            }
            TransitionOutcome::StatusMismatch(_) => Err(CoreError::InvalidTransition(
                "only pending orders can be cancelled".to_string(),
            )),
            TransitionOutcome::NotFound => Err(CoreError::NotFound("booking")),
        }
    }

    /// A user's bookings, newest first.
    pub async fn history(&self, user_id: i64) -> Result<Vec<Booking>, CoreError> {
        self.bookings.list_for_user(user_id).await
    }

    pub async fn detail(&self, booking_code: &str) -> Result<Booking, CoreError> {
        self.bookings
            .find_by_code(booking_code)
            .await?
            .ok_or(CoreError::NotFound("booking"))
    }

    /// Every booking, newest first. Admin overview.
    pub async fn list_all(&self) -> Result<Vec<Booking>, CoreError> {
        self.bookings.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesona_store::memory::{MemoryBookingRepository, MemoryListingRepository};

    async fn ledger_with_price(listing_id: i64, unit_price: i64) -> (BookingLedger, Arc<MemoryListingRepository>) {
        let bookings = Arc::new(MemoryBookingRepository::new());
        let listings = Arc::new(MemoryListingRepository::new());
        listings.set_price(listing_id, unit_price).await;
        (BookingLedger::new(bookings, listings.clone()), listings)
    }

    fn request(listing_id: i64, user_id: i64, quantity: i32) -> CreateBooking {
        CreateBooking {
            listing_id,
            user_id,
            visit_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            quantity,
            payment_method: "transfer".to_string(),
        }
    }

    #[tokio::test]
    async fn create_snapshots_the_price_and_computes_an_exact_total() {
        let (ledger, listings) = ledger_with_price(5, 100_000).await;

        let booking = ledger.create(request(5, 9, 2)).await.unwrap();
        assert_eq!(booking.unit_price, 100_000);
        assert_eq!(booking.total_price, 200_000);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.booking_code.starts_with("WST-"));

        // A later price change never reaches an existing booking.
        listings.set_price(5, 999_999).await;
        let detail = ledger.detail(&booking.booking_code).await.unwrap();
        assert_eq!(detail.total_price, 200_000);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_quantity() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;

        for quantity in [0, -1, -50] {
            let err = ledger.create(request(5, 9, quantity)).await.unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "quantity {quantity}");
        }
    }

    #[tokio::test]
    async fn create_rejects_unknown_listing() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;

        let err = ledger.create(request(42, 9, 1)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound("listing")));
    }

    #[tokio::test]
    async fn mark_paid_moves_pending_to_paid_and_is_idempotent() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;
        let booking = ledger.create(request(5, 9, 1)).await.unwrap();

        let paid = ledger.mark_paid(&booking.booking_code).await.unwrap();
        assert_eq!(paid.status, BookingStatus::Paid);

        // Payment retries land on an already-paid row.
        let again = ledger.mark_paid(&booking.booking_code).await.unwrap();
        assert_eq!(again.status, BookingStatus::Paid);
    }

    #[tokio::test]
    async fn mark_paid_fails_for_unknown_code() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;
        let err = ledger.mark_paid("WST-NOPE").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound("booking")));
    }

    #[tokio::test]
    async fn cancel_after_payment_is_an_invalid_transition() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;
        let booking = ledger.create(request(5, 9, 1)).await.unwrap();
        ledger.mark_paid(&booking.booking_code).await.unwrap();

        let err = ledger.cancel(&booking.booking_code).await.unwrap_err();
        match err {
            CoreError::InvalidTransition(msg) => {
                assert_eq!(msg, "only pending orders can be cancelled");
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn paying_a_cancelled_booking_is_an_invalid_transition() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;
        let booking = ledger.create(request(5, 9, 1)).await.unwrap();
        ledger.cancel(&booking.booking_code).await.unwrap();

        let err = ledger.mark_paid(&booking.booking_code).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn history_is_newest_first_and_scoped_to_the_user() {
        let (ledger, _) = ledger_with_price(5, 100_000).await;
        let first = ledger.create(request(5, 9, 1)).await.unwrap();
        let second = ledger.create(request(5, 9, 3)).await.unwrap();
        ledger.create(request(5, 7, 1)).await.unwrap();

        let history = ledger.history(9).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].booking_code, second.booking_code);
        assert_eq!(history[1].booking_code, first.booking_code);
    }

    #[tokio::test]
    async fn racing_cancel_and_pay_produce_exactly_one_winner() {
        for _ in 0..20 {
            let (ledger, _) = ledger_with_price(5, 100_000).await;
            let ledger = Arc::new(ledger);
            let booking = ledger.create(request(5, 9, 1)).await.unwrap();

            let code_a = booking.booking_code.clone();
            let code_b = booking.booking_code.clone();
            let l_a = ledger.clone();
            let l_b = ledger.clone();

            let cancel = tokio::spawn(async move { l_a.cancel(&code_a).await });
            let pay = tokio::spawn(async move { l_b.mark_paid(&code_b).await });

            let cancel_ok = cancel.await.unwrap().is_ok();
            let pay_ok = pay.await.unwrap().is_ok();

            assert!(
                cancel_ok ^ pay_ok,
                "exactly one of the racing transitions must commit (cancel={cancel_ok}, pay={pay_ok})"
            );

            let final_status = ledger.detail(&booking.booking_code).await.unwrap().status;
            if cancel_ok {
                assert_eq!(final_status, BookingStatus::Cancelled);
            } else {
                assert_eq!(final_status, BookingStatus::Paid);
            }
        }
    }
}
