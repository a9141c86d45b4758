pub mod booking;
pub mod error;
pub mod repository;
pub mod review;
pub mod user;

pub use error::CoreError;
