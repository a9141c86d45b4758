use std::sync::Arc;
use tracing::info;

use pesona_core::booking::BookingStatus;
use pesona_core::repository::{BookingRepository, ReviewRepository};
use pesona_core::review::{NewReview, Review};
use pesona_core::CoreError;

/// Admits reviews only from visitors with a qualifying booking and routes
/// them through an admin moderation queue.
pub struct ReviewGate {
    reviews: Arc<dyn ReviewRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ReviewGate {
    pub fn new(reviews: Arc<dyn ReviewRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { reviews, bookings }
    }

    /// Submit a review. Requires a booking for (user, listing) whose status
    /// is paid or completed; new reviews always start unapproved.
    pub async fn submit(
        &self,
        listing_id: i64,
        user_id: i64,
        rating: i32,
        comment: String,
    ) -> Result<Review, CoreError> {
        if !(1..=5).contains(&rating) {
            return Err(CoreError::validation("rating must be between 1 and 5"));
        }

        let eligible = self
            .bookings
            .exists_with_status(user_id, listing_id, BookingStatus::QUALIFYING)
            .await?;

        if !eligible {
            return Err(CoreError::NotEligible(
                "a paid visit is required before reviewing".to_string(),
            ));
        }

        let review = self
            .reviews
            .insert(NewReview {
                listing_id,
                user_id,
                rating,
                comment,
            })
            .await?;

        info!(review_id = review.id, listing_id, user_id, "review submitted for moderation");
        Ok(review)
    }

    /// Approve a pending review. Admin scope is enforced at the boundary.
    pub async fn approve(&self, review_id: i64) -> Result<(), CoreError> {
        if self.reviews.approve(review_id).await? {
            info!(review_id, "review approved");
            Ok(())
        } else {
            Err(CoreError::NotFound("review"))
        }
    }

    /// Remove a review outright. Admin scope is enforced at the boundary.
    pub async fn delete(&self, review_id: i64) -> Result<(), CoreError> {
        if self.reviews.delete(review_id).await? {
            info!(review_id, "review deleted");
            Ok(())
        } else {
            Err(CoreError::NotFound("review"))
        }
    }

    /// Approved reviews for a listing, newest first.
    pub async fn list_approved(&self, listing_id: i64) -> Result<Vec<Review>, CoreError> {
        self.reviews.list_approved(listing_id).await
    }

    /// Moderation queue: every review, newest first, approval flag included.
    pub async fn list_pending(&self) -> Result<Vec<Review>, CoreError> {
        self.reviews.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pesona_core::booking::NewBooking;
    use pesona_core::repository::TransitionOutcome;
    use pesona_store::memory::{MemoryBookingRepository, MemoryReviewRepository};

    async fn gate_with_booking(status: Option<BookingStatus>) -> ReviewGate {
        let bookings = Arc::new(MemoryBookingRepository::new());

        if let Some(status) = status {
            bookings
                .insert(NewBooking {
                    booking_code: "WST-TEST01".to_string(),
                    listing_id: 5,
                    user_id: 9,
                    visit_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
                    quantity: 1,
                    unit_price: 100_000,
                    total_price: 100_000,
                    payment_method: "transfer".to_string(),
                })
                .await
                .unwrap();

            if status != BookingStatus::Pending {
                let outcome = bookings
                    .transition("WST-TEST01", &[BookingStatus::Pending], status)
                    .await
                    .unwrap();
                assert!(matches!(outcome, TransitionOutcome::Applied(_)));
            }
        }

        ReviewGate::new(Arc::new(MemoryReviewRepository::new()), bookings)
    }

    #[tokio::test]
    async fn submit_requires_a_qualifying_booking() {
        // No booking at all.
        let gate = gate_with_booking(None).await;
        let err = gate.submit(5, 9, 5, "bagus".to_string()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotEligible(_)));

        // Pending does not qualify.
        let gate = gate_with_booking(Some(BookingStatus::Pending)).await;
        let err = gate.submit(5, 9, 5, "bagus".to_string()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotEligible(_)));

        // Cancelled does not qualify.
        let gate = gate_with_booking(Some(BookingStatus::Cancelled)).await;
        let err = gate.submit(5, 9, 5, "bagus".to_string()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotEligible(_)));
    }

    #[tokio::test]
    async fn paid_and_completed_bookings_qualify() {
        for status in [BookingStatus::Paid, BookingStatus::Completed] {
            let gate = gate_with_booking(Some(status)).await;
            let review = gate.submit(5, 9, 4, "mantap".to_string()).await.unwrap();
            assert!(!review.approved, "new reviews await moderation");
            assert_eq!(review.rating, 4);
        }
    }

    #[tokio::test]
    async fn submit_rejects_out_of_range_ratings() {
        let gate = gate_with_booking(Some(BookingStatus::Paid)).await;
        for rating in [0, -1, 6, 100] {
            let err = gate.submit(5, 9, rating, "x".to_string()).await.unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "rating {rating}");
        }
    }

    #[tokio::test]
    async fn only_approved_reviews_are_listed_publicly() {
        let gate = gate_with_booking(Some(BookingStatus::Paid)).await;

        let first = gate.submit(5, 9, 5, "pertama".to_string()).await.unwrap();
        let second = gate.submit(5, 9, 3, "kedua".to_string()).await.unwrap();

        assert!(gate.list_approved(5).await.unwrap().is_empty());
        assert_eq!(gate.list_pending().await.unwrap().len(), 2);

        gate.approve(second.id).await.unwrap();
        let listed = gate.list_approved(5).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);

        gate.approve(first.id).await.unwrap();
        let listed = gate.list_approved(5).await.unwrap();
        assert_eq!(listed[0].id, second.id, "newest first");
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn approve_and_delete_report_missing_ids() {
        let gate = gate_with_booking(Some(BookingStatus::Paid)).await;

        let err = gate.approve(404).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound("review")));

        let review = gate.submit(5, 9, 5, "hapus".to_string()).await.unwrap();
        gate.delete(review.id).await.unwrap();
        let err = gate.delete(review.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound("review")));
        assert!(gate.list_pending().await.unwrap().is_empty());
    }
}
