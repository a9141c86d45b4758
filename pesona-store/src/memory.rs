//! In-memory repositories honouring the same contracts as the Postgres
//! ones, status transitions included: the guard and the write happen under
//! one lock, so the compare-and-swap semantics hold.
//!
//! Used by unit and integration tests, and handy for local demos without a
//! database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use pesona_core::booking::{Booking, BookingStatus, NewBooking};
use pesona_core::repository::{
    BookingRepository, ListingRepository, ReviewRepository, TransitionOutcome, UserRepository,
};
use pesona_core::review::{NewReview, Review};
use pesona_core::user::{NewUser, User};
use pesona_core::CoreError;

#[derive(Default)]
pub struct MemoryBookingRepository {
    inner: Mutex<BookingTable>,
}

#[derive(Default)]
struct BookingTable {
    rows: Vec<Booking>,
    next_id: i64,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn insert(&self, booking: NewBooking) -> Result<Booking, CoreError> {
        let mut table = self.inner.lock().await;
        table.next_id += 1;
        let now = Utc::now();

        let row = Booking {
            id: table.next_id,
            booking_code: booking.booking_code,
            listing_id: booking.listing_id,
            user_id: booking.user_id,
            visit_date: booking.visit_date,
            quantity: booking.quantity,
            unit_price: booking.unit_price,
            total_price: booking.total_price,
            status: BookingStatus::Pending,
            payment_method: booking.payment_method,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, CoreError> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().find(|b| b.booking_code == code).cloned())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, CoreError> {
        let table = self.inner.lock().await;
        let mut rows: Vec<Booking> = table
            .rows
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, CoreError> {
        let table = self.inner.lock().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn transition(
        &self,
        code: &str,
        expected: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<TransitionOutcome, CoreError> {
        let mut table = self.inner.lock().await;
        match table.rows.iter_mut().find(|b| b.booking_code == code) {
            Some(row) if expected.contains(&row.status) => {
                row.status = to;
                row.updated_at = Utc::now();
                Ok(TransitionOutcome::Applied(row.clone()))
            }
            Some(row) => Ok(TransitionOutcome::StatusMismatch(row.status)),
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    async fn exists_with_status(
        &self,
        user_id: i64,
        listing_id: i64,
        statuses: &[BookingStatus],
    ) -> Result<bool, CoreError> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().any(|b| {
            b.user_id == user_id && b.listing_id == listing_id && statuses.contains(&b.status)
        }))
    }
}

#[derive(Default)]
pub struct MemoryReviewRepository {
    inner: Mutex<ReviewTable>,
}

#[derive(Default)]
struct ReviewTable {
    rows: Vec<Review>,
    next_id: i64,
}

impl MemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn insert(&self, review: NewReview) -> Result<Review, CoreError> {
        let mut table = self.inner.lock().await;
        table.next_id += 1;

        let row = Review {
            id: table.next_id,
            listing_id: review.listing_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            approved: false,
            created_at: Utc::now(),
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn approve(&self, review_id: i64) -> Result<bool, CoreError> {
        let mut table = self.inner.lock().await;
        match table.rows.iter_mut().find(|r| r.id == review_id) {
            Some(row) => {
                row.approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, review_id: i64) -> Result<bool, CoreError> {
        let mut table = self.inner.lock().await;
        let before = table.rows.len();
        table.rows.retain(|r| r.id != review_id);
        Ok(table.rows.len() < before)
    }

    async fn list_approved(&self, listing_id: i64) -> Result<Vec<Review>, CoreError> {
        let table = self.inner.lock().await;
        let mut rows: Vec<Review> = table
            .rows
            .iter()
            .filter(|r| r.listing_id == listing_id && r.approved)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<Review>, CoreError> {
        let table = self.inner.lock().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryListingRepository {
    prices: Mutex<HashMap<i64, i64>>,
}

impl MemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, listing_id: i64, unit_price: i64) {
        self.prices.lock().await.insert(listing_id, unit_price);
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn unit_price(&self, listing_id: i64) -> Result<Option<i64>, CoreError> {
        Ok(self.prices.lock().await.get(&listing_id).copied())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    inner: Mutex<UserTable>,
}

#[derive(Default)]
struct UserTable {
    rows: Vec<User>,
    next_id: i64,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly, bypassing registration. Test helper.
    pub async fn seed(&self, user: NewUser, is_active: bool) -> User {
        let mut table = self.inner.lock().await;
        table.next_id += 1;
        let row = User {
            id: table.next_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            is_active,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.push(row.clone());
        row
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, CoreError> {
        let table = self.inner.lock().await;
        Ok(table
            .rows
            .iter()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, CoreError> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, CoreError> {
        let mut table = self.inner.lock().await;
        let taken = table
            .rows
            .iter()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(CoreError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        table.next_id += 1;
        let row = User {
            id: table.next_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            is_active: true,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn record_login(&self, _user_id: i64) -> Result<(), CoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_booking(code: &str) -> NewBooking {
        NewBooking {
            booking_code: code.to_string(),
            listing_id: 5,
            user_id: 9,
            visit_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            quantity: 2,
            unit_price: 100_000,
            total_price: 200_000,
            payment_method: "transfer".to_string(),
        }
    }

    #[tokio::test]
    async fn transition_applies_only_when_status_matches() {
        let repo = MemoryBookingRepository::new();
        repo.insert(new_booking("WST-1")).await.unwrap();

        let outcome = repo
            .transition("WST-1", &[BookingStatus::Pending], BookingStatus::Paid)
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Applied(ref b) if b.status == BookingStatus::Paid));

        let outcome = repo
            .transition("WST-1", &[BookingStatus::Pending], BookingStatus::Cancelled)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::StatusMismatch(BookingStatus::Paid)
        ));

        let outcome = repo
            .transition("WST-404", &[BookingStatus::Pending], BookingStatus::Paid)
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::NotFound));
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let repo = MemoryBookingRepository::new();
        repo.insert(new_booking("WST-1")).await.unwrap();
        repo.insert(new_booking("WST-2")).await.unwrap();
        repo.insert(new_booking("WST-3")).await.unwrap();

        let rows = repo.list_for_user(9).await.unwrap();
        let codes: Vec<&str> = rows.iter().map(|b| b.booking_code.as_str()).collect();
        assert_eq!(codes, vec!["WST-3", "WST-2", "WST-1"]);
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let repo = MemoryUserRepository::new();
        let user = NewUser {
            username: "budi".to_string(),
            email: "budi@example.com".to_string(),
            full_name: "Budi".to_string(),
            phone: None,
            role: "user".to_string(),
            password_hash: "x".to_string(),
        };
        repo.insert(user.clone()).await.unwrap();

        let err = repo.insert(user).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}
