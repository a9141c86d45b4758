use async_trait::async_trait;
use sqlx::PgPool;

use pesona_core::repository::ReviewRepository;
use pesona_core::review::{NewReview, Review};
use pesona_core::CoreError;

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    listing_id: i64,
    user_id: i64,
    rating: i32,
    comment: String,
    approved: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            listing_id: row.listing_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            approved: row.approved,
            created_at: row.created_at,
        }
    }
}

const REVIEW_COLUMNS: &str = "id, listing_id, user_id, rating, comment, approved, created_at";

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn insert(&self, review: NewReview) -> Result<Review, CoreError> {
        let sql = format!(
            "INSERT INTO reviews (listing_id, user_id, rating, comment, approved) \
             VALUES ($1, $2, $3, $4, FALSE) \
             RETURNING {REVIEW_COLUMNS}"
        );

        let row: ReviewRow = sqlx::query_as(&sql)
            .bind(review.listing_id)
            .bind(review.user_id)
            .bind(review.rating)
            .bind(&review.comment)
            .fetch_one(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(row.into())
    }

    async fn approve(&self, review_id: i64) -> Result<bool, CoreError> {
        let result = sqlx::query("UPDATE reviews SET approved = TRUE WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, review_id: i64) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_approved(&self, listing_id: i64) -> Result<Vec<Review>, CoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE listing_id = $1 AND approved = TRUE \
             ORDER BY created_at DESC, id DESC"
        );

        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .bind(listing_id)
            .fetch_all(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Review>, CoreError> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC");

        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(rows.into_iter().map(Review::from).collect())
    }
}
