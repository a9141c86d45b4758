use async_trait::async_trait;

use crate::booking::{Booking, BookingStatus, NewBooking};
use crate::error::CoreError;
use crate::review::{NewReview, Review};
use crate::user::{NewUser, User};

/// Outcome of a conditional status update.
///
/// Transitions are a single compare-and-swap against the store: the row
/// moves only if its current status is in the expected set, so two racing
/// transitions on the same code resolve with exactly one winner.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The row matched and was updated; carries the post-update booking.
    Applied(Booking),
    /// The row exists but its status was outside the expected set.
    StatusMismatch(BookingStatus),
    /// No booking with that code.
    NotFound,
}

/// Repository trait for booking rows.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, CoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, CoreError>;

    /// Bookings for one user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, CoreError>;

    /// Every booking, newest first.
    async fn list_all(&self) -> Result<Vec<Booking>, CoreError>;

    /// Atomically move `code` to `to` if its stored status is in `expected`.
    async fn transition(
        &self,
        code: &str,
        expected: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<TransitionOutcome, CoreError>;

    /// Whether (user, listing) has any booking in one of `statuses`.
    async fn exists_with_status(
        &self,
        user_id: i64,
        listing_id: i64,
        statuses: &[BookingStatus],
    ) -> Result<bool, CoreError>;
}

/// Repository trait for review rows.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: NewReview) -> Result<Review, CoreError>;

    /// Returns false when the id does not exist.
    async fn approve(&self, review_id: i64) -> Result<bool, CoreError>;

    async fn delete(&self, review_id: i64) -> Result<bool, CoreError>;

    /// Approved reviews for a listing, newest first.
    async fn list_approved(&self, listing_id: i64) -> Result<Vec<Review>, CoreError>;

    /// Every review regardless of approval, newest first.
    async fn list_all(&self) -> Result<Vec<Review>, CoreError>;
}

/// Read-side access to listings; their CRUD lives outside this core.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Current ticket price in minor units, or None for an unknown listing.
    async fn unit_price(&self, listing_id: i64) -> Result<Option<i64>, CoreError>;
}

/// Repository trait for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lookup by username or email.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, CoreError>;

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, CoreError>;

    /// Fails with `Conflict` when username or email is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, CoreError>;

    async fn record_login(&self, user_id: i64) -> Result<(), CoreError>;
}
