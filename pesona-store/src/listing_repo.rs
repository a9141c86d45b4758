use async_trait::async_trait;
use sqlx::PgPool;

use pesona_core::repository::ListingRepository;
use pesona_core::CoreError;

/// Read-only view of the listings table; listing CRUD is owned elsewhere.
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn unit_price(&self, listing_id: i64) -> Result<Option<i64>, CoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT unit_price FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(row.map(|(price,)| price))
    }
}
