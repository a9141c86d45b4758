pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod listing_repo;
pub mod memory;
pub mod review_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use listing_repo::PgListingRepository;
pub use review_repo::PgReviewRepository;
pub use user_repo::PgUserRepository;
