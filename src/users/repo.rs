use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{user_key, UserCache};
use crate::error::UserError;
use crate::users::repo_types::{NewUser, User};

/// Persistence for users. One finder per lookup key so each maps onto an
/// indexed column.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; the returned record carries the assigned id.
    async fn create(&self, user: NewUser) -> Result<User, UserError>;
    async fn find_by_login(&self, login: &str) -> Result<User, UserError>;
    async fn find_by_email(&self, email: &str) -> Result<User, UserError>;
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<User, UserError>;
    async fn find_by_id(&self, id: Uuid) -> Result<User, UserError>;
    /// Drop the cached projection of a user. Never fails the caller.
    async fn invalidate_cache(&self, id: Uuid);
}

/// Best-effort delete of `user:{id}`; errors are logged and dropped.
async fn invalidate(cache: &dyn UserCache, id: Uuid) {
    let key = user_key(id);
    match cache.delete(&key).await {
        Ok(()) => debug!(user_id = %id, "user cache invalidated"),
        Err(e) => warn!(error = %e, user_id = %id, "user cache invalidation failed"),
    }
}

// ---- Postgres ----

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
    cache: Arc<dyn UserCache>,
}

enum Lookup<'a> {
    Login(&'a str),
    Email(&'a str),
    PhoneNumber(&'a str),
    Id(Uuid),
}

const INSERT_USER: &str = r#"
    INSERT INTO users (login, email, phone_number, password, username)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, login, email, phone_number, password, username
"#;

const FIND_BY_LOGIN: &str = r#"
    SELECT id, login, email, phone_number, password, username
    FROM users
    WHERE login = $1
"#;

const FIND_BY_EMAIL: &str = r#"
    SELECT id, login, email, phone_number, password, username
    FROM users
    WHERE email = $1
"#;

const FIND_BY_PHONE_NUMBER: &str = r#"
    SELECT id, login, email, phone_number, password, username
    FROM users
    WHERE phone_number = $1
    LIMIT 1
"#;

const FIND_BY_ID: &str = r#"
    SELECT id, login, email, phone_number, password, username
    FROM users
    WHERE id = $1
"#;

impl PgUserStore {
    pub fn new(db: PgPool, cache: Arc<dyn UserCache>) -> Self {
        Self { db, cache }
    }

    async fn find_one(&self, lookup: Lookup<'_>) -> Result<User, UserError> {
        let query = match lookup {
            Lookup::Login(login) => sqlx::query_as::<_, User>(FIND_BY_LOGIN).bind(login),
            Lookup::Email(email) => sqlx::query_as::<_, User>(FIND_BY_EMAIL).bind(email),
            Lookup::PhoneNumber(phone) => {
                sqlx::query_as::<_, User>(FIND_BY_PHONE_NUMBER).bind(phone)
            }
            Lookup::Id(id) => sqlx::query_as::<_, User>(FIND_BY_ID).bind(id),
        };
        query
            .fetch_optional(&self.db)
            .await
            .map_err(classify)?
            .ok_or(UserError::NotFound)
    }
}

/// Split sqlx failures into conflicts (unique violations) and storage faults.
fn classify(e: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("users_email_key") => "email",
                _ => "login",
            };
            return UserError::Conflict(format!("user with this {} already exists", field));
        }
    }
    UserError::Persistence(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let created = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(&user.login)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(&user.password)
            .bind(&user.username)
            .fetch_one(&self.db)
            .await
            .map_err(classify)?;
        self.invalidate_cache(created.id).await;
        Ok(created)
    }

    async fn find_by_login(&self, login: &str) -> Result<User, UserError> {
        self.find_one(Lookup::Login(login)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, UserError> {
        self.find_one(Lookup::Email(email)).await
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<User, UserError> {
        self.find_one(Lookup::PhoneNumber(phone_number)).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, UserError> {
        self.find_one(Lookup::Id(id)).await
    }

    async fn invalidate_cache(&self, id: Uuid) {
        invalidate(self.cache.as_ref(), id).await;
    }
}

// ---- In-memory ----

/// Process-local store with the same uniqueness rules as the `users` table.
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
    cache: Arc<dyn UserCache>,
}

impl InMemoryUserStore {
    pub fn new(cache: Arc<dyn UserCache>) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            cache,
        }
    }

    async fn find_first<F>(&self, pred: F) -> Result<User, UserError>
    where
        F: Fn(&User) -> bool,
    {
        self.users
            .read()
            .await
            .iter()
            .find(|&u| pred(u))
            .cloned()
            .ok_or(UserError::NotFound)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let created = {
            let mut users = self.users.write().await;
            if users.iter().any(|u| u.login == user.login) {
                return Err(UserError::Conflict(
                    "user with this login already exists".into(),
                ));
            }
            if users.iter().any(|u| u.email == user.email) {
                return Err(UserError::Conflict(
                    "user with this email already exists".into(),
                ));
            }
            let created = user.into_user(Uuid::new_v4());
            users.push(created.clone());
            created
        };
        self.invalidate_cache(created.id).await;
        Ok(created)
    }

    async fn find_by_login(&self, login: &str) -> Result<User, UserError> {
        self.find_first(|u| u.login == login).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, UserError> {
        self.find_first(|u| u.email == email).await
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<User, UserError> {
        self.find_first(|u| u.phone_number == phone_number).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, UserError> {
        self.find_first(|u| u.id == id).await
    }

    async fn invalidate_cache(&self, id: Uuid) {
        invalidate(self.cache.as_ref(), id).await;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use uuid::Uuid;

    use super::UserStore;
    use crate::error::UserError;
    use crate::users::repo_types::{NewUser, User};

    /// Every call fails with a storage fault, like a pool that timed out.
    pub struct BrokenUserStore;

    fn fault() -> UserError {
        UserError::Persistence(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl UserStore for BrokenUserStore {
        async fn create(&self, _user: NewUser) -> Result<User, UserError> {
            Err(fault())
        }

        async fn find_by_login(&self, _login: &str) -> Result<User, UserError> {
            Err(fault())
        }

        async fn find_by_email(&self, _email: &str) -> Result<User, UserError> {
            Err(fault())
        }

        async fn find_by_phone_number(&self, _phone_number: &str) -> Result<User, UserError> {
            Err(fault())
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<User, UserError> {
            Err(fault())
        }

        async fn invalidate_cache(&self, _id: Uuid) {}
    }
}
