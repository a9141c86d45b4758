pub mod code;
pub mod ledger;

pub use ledger::{BookingLedger, CreateBooking};
