use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_code: String,
    pub listing_id: i64,
    pub user_id: i64,
    pub visit_date: NaiveDate,
    pub quantity: i32,
    /// Listing price at creation time; never re-read afterwards.
    pub unit_price: i64,
    /// unit_price * quantity, fixed at creation.
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Paid,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "paid" => Some(BookingStatus::Paid),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Statuses that make a booking count as a qualifying visit for reviews.
    pub const QUALIFYING: &'static [BookingStatus] =
        &[BookingStatus::Paid, BookingStatus::Completed];
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row to persist for a new booking; the store assigns the numeric id.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_code: String,
    pub listing_id: i64,
    pub user_id: i64,
    pub visit_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub payment_method: String,
}
