use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, TimeZone, Utc};
use cookie::time::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use pesona_core::repository::UserRepository;
use pesona_core::user::{NewUser, User};
use pesona_core::CoreError;

use crate::password;

/// Credential namespace. The two scopes keep independent cookies and are
/// never interchangeable: an admin token cannot satisfy a user-scoped
/// check, nor the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "admin-scope")]
    Admin,
    #[serde(rename = "user-scope")]
    User,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Admin => "admin-scope",
            Scope::User => "user-scope",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    role: String,
    scope: Scope,
    exp: usize,
}

/// A resolved session. Role and scope are fixed at login time.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub role: String,
    pub scope: Scope,
    pub expires_at: DateTime<Utc>,
}

/// Secret material and per-scope cookie parameters, injected once at
/// startup instead of living in globals.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub admin_cookie_name: String,
    pub user_cookie_name: String,
    pub admin_max_age_seconds: u64,
    pub user_max_age_seconds: u64,
}

pub struct SessionAuthority {
    settings: SessionSettings,
}

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

impl SessionAuthority {
    pub fn new(settings: SessionSettings) -> Self {
        Self { settings }
    }

    pub fn scope_for_role(role: &str) -> Scope {
        if role == "admin" || role == "superadmin" {
            Scope::Admin
        } else {
            Scope::User
        }
    }

    fn cookie_name(&self, scope: Scope) -> &str {
        match scope {
            Scope::Admin => &self.settings.admin_cookie_name,
            Scope::User => &self.settings.user_cookie_name,
        }
    }

    fn max_age_seconds(&self, scope: Scope) -> u64 {
        match scope {
            Scope::Admin => self.settings.admin_max_age_seconds,
            Scope::User => self.settings.user_max_age_seconds,
        }
    }

    /// Verify credentials and issue a session in the scope matching the
    /// account's role. Unknown login and wrong password are reported
    /// identically.
    pub async fn authenticate(
        &self,
        users: &dyn UserRepository,
        login: &str,
        password: &str,
    ) -> Result<(User, Session, Cookie<'static>), CoreError> {
        let user = users
            .find_by_login(login)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("invalid credentials".to_string()))?;

        if !user.is_active {
            return Err(CoreError::AccountDisabled);
        }

        if !password::verify(password, &user.password_hash) {
            return Err(CoreError::Unauthorized("invalid credentials".to_string()));
        }

        users.record_login(user.id).await?;

        let scope = Self::scope_for_role(&user.role);
        let (session, cookie) = self.issue(&user, scope)?;
        info!(user_id = user.id, scope = scope.as_str(), "session issued");

        Ok((user, session, cookie))
    }

    /// Create a fresh end-user account with a hashed password.
    pub async fn register(
        &self,
        users: &dyn UserRepository,
        input: RegisterInput,
    ) -> Result<User, CoreError> {
        if input.username.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
        {
            return Err(CoreError::validation(
                "username, email and password are required",
            ));
        }

        users
            .insert(NewUser {
                username: input.username,
                email: input.email,
                full_name: input.full_name,
                phone: input.phone,
                role: "user".to_string(),
                password_hash: password::hash(&input.password),
            })
            .await
    }

    fn issue(&self, user: &User, scope: Scope) -> Result<(Session, Cookie<'static>), CoreError> {
        let max_age = self.max_age_seconds(scope);
        let expires_at = Utc::now() + chrono::Duration::seconds(max_age as i64);

        let claims = Claims {
            sub: user.id,
            role: user.role.clone(),
            scope,
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| CoreError::persistence(format!("token encoding failed: {e}")))?;

        let cookie = Cookie::build((self.cookie_name(scope).to_string(), token))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(max_age as i64))
            .build();

        let session = Session {
            user_id: user.id,
            role: user.role.clone(),
            scope,
            expires_at,
        };

        Ok((session, cookie))
    }

    /// Resolve a session strictly within one scope. Only that scope's
    /// cookie is consulted, and the embedded scope claim must match.
    pub fn current_session(&self, jar: &CookieJar, scope: Scope) -> Result<Session, CoreError> {
        let cookie = jar
            .get(self.cookie_name(scope))
            .ok_or_else(|| CoreError::Unauthorized("missing session".to_string()))?;

        let data = decode::<Claims>(
            cookie.value(),
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| CoreError::Unauthorized("invalid session".to_string()))?;

        if data.claims.scope != scope {
            return Err(CoreError::Unauthorized("wrong session scope".to_string()));
        }

        Ok(Session {
            user_id: data.claims.sub,
            role: data.claims.role,
            scope,
            expires_at: Utc
                .timestamp_opt(data.claims.exp as i64, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    /// Resolve whichever scope authenticates, admin first.
    pub fn current_session_either(&self, jar: &CookieJar) -> Result<Session, CoreError> {
        self.current_session(jar, Scope::Admin)
            .or_else(|_| self.current_session(jar, Scope::User))
    }

    /// Removal cookie that expires the given scope's session immediately.
    /// The other scope is untouched.
    pub fn removal_cookie(&self, scope: Scope) -> Cookie<'static> {
        Cookie::build((self.cookie_name(scope).to_string(), String::new()))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .max_age(Duration::ZERO)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesona_core::user::NewUser;
    use pesona_store::memory::MemoryUserRepository;

    fn authority() -> SessionAuthority {
        SessionAuthority::new(SessionSettings {
            secret: "test-secret".to_string(),
            admin_cookie_name: "admin-session-token".to_string(),
            user_cookie_name: "user-session-token".to_string(),
            admin_max_age_seconds: 3600 * 8,
            user_max_age_seconds: 86400 * 7,
        })
    }

    async fn seed_user(repo: &MemoryUserRepository, role: &str, active: bool) -> User {
        repo.seed(
            NewUser {
                username: format!("{role}-budi"),
                email: format!("{role}@example.com"),
                full_name: "Budi Santoso".to_string(),
                phone: None,
                role: role.to_string(),
                password_hash: password::hash("kata-sandi"),
            },
            active,
        )
        .await
    }

    #[tokio::test]
    async fn authenticate_issues_a_scoped_session() {
        let repo = MemoryUserRepository::new();
        seed_user(&repo, "user", true).await;

        let auth = authority();
        let (user, session, cookie) = auth
            .authenticate(&repo, "user-budi", "kata-sandi")
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.scope, Scope::User);
        assert_eq!(cookie.name(), "user-session-token");
        assert!(cookie.http_only().unwrap_or(false));
    }

    #[tokio::test]
    async fn admin_roles_land_in_admin_scope() {
        let repo = MemoryUserRepository::new();
        seed_user(&repo, "superadmin", true).await;

        let auth = authority();
        let (_, session, cookie) = auth
            .authenticate(&repo, "superadmin-budi", "kata-sandi")
            .await
            .unwrap();

        assert_eq!(session.scope, Scope::Admin);
        assert_eq!(cookie.name(), "admin-session-token");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_login_look_identical() {
        let repo = MemoryUserRepository::new();
        seed_user(&repo, "user", true).await;
        let auth = authority();

        let e1 = auth
            .authenticate(&repo, "user-budi", "salah")
            .await
            .unwrap_err();
        let e2 = auth
            .authenticate(&repo, "nobody", "salah")
            .await
            .unwrap_err();

        assert_eq!(e1.to_string(), e2.to_string());
    }

    #[tokio::test]
    async fn disabled_account_is_rejected() {
        let repo = MemoryUserRepository::new();
        seed_user(&repo, "user", false).await;
        let auth = authority();

        let err = auth
            .authenticate(&repo, "user-budi", "kata-sandi")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccountDisabled));
    }

    #[tokio::test]
    async fn scopes_are_not_interchangeable() {
        let repo = MemoryUserRepository::new();
        seed_user(&repo, "admin", true).await;
        let auth = authority();

        let (_, _, admin_cookie) = auth
            .authenticate(&repo, "admin-budi", "kata-sandi")
            .await
            .unwrap();

        // Token presented under its own cookie resolves in admin scope only.
        let jar = CookieJar::new().add(admin_cookie.clone());
        assert!(auth.current_session(&jar, Scope::Admin).is_ok());
        assert!(auth.current_session(&jar, Scope::User).is_err());

        // Even smuggled into the user cookie, the scope claim fails.
        let smuggled = Cookie::new(
            "user-session-token".to_string(),
            admin_cookie.value().to_string(),
        );
        let jar = CookieJar::new().add(smuggled);
        let err = auth.current_session(&jar, Scope::User).unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn removal_cookie_expires_one_scope_only() {
        let auth = authority();
        let removal = auth.removal_cookie(Scope::User);

        assert_eq!(removal.name(), "user-session-token");
        assert_eq!(removal.max_age(), Some(Duration::ZERO));
        assert_eq!(removal.value(), "");
    }

    #[tokio::test]
    async fn register_hashes_the_password_and_defaults_to_user_role() {
        let repo = MemoryUserRepository::new();
        let auth = authority();

        let user = auth
            .register(
                &repo,
                RegisterInput {
                    username: "sari".to_string(),
                    email: "sari@example.com".to_string(),
                    password: "rahasia".to_string(),
                    full_name: "Sari Dewi".to_string(),
                    phone: Some("0812".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(user.role, "user");
        assert_ne!(user.password_hash, "rahasia");
        assert!(password::verify("rahasia", &user.password_hash));

        let err = auth
            .register(
                &repo,
                RegisterInput {
                    username: "sari".to_string(),
                    email: "other@example.com".to_string(),
                    password: "rahasia".to_string(),
                    full_name: "Sari Dewi".to_string(),
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}
