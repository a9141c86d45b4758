use async_trait::async_trait;
use sqlx::PgPool;

use pesona_core::repository::UserRepository;
use pesona_core::user::{NewUser, User};
use pesona_core::CoreError;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    full_name: String,
    phone: Option<String>,
    role: String,
    is_active: bool,
    password_hash: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            role: row.role,
            is_active: row.is_active,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, full_name, phone, role, is_active, password_hash, created_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, CoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1");

        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, CoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(row.map(User::from))
    }

    async fn insert(&self, user: NewUser) -> Result<User, CoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, full_name, phone, role, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE) \
             RETURNING {USER_COLUMNS}"
        );

        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(&user.phone)
            .bind(&user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if err
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false)
                {
                    CoreError::Conflict("username or email already registered".to_string())
                } else {
                    CoreError::persistence(err)
                }
            })?;

        Ok(row.into())
    }

    async fn record_login(&self, user_id: i64) -> Result<(), CoreError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(CoreError::persistence)?;

        Ok(())
    }
}
