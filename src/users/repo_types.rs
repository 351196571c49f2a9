use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,                 // assigned by the store
    pub login: String,            // unique handle
    pub email: String,            // unique
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password: String,         // write-only, never in JSON
    pub username: String,
}

/// Insert shape: a user before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub username: String,
}

impl NewUser {
    pub(crate) fn into_user(self, id: Uuid) -> User {
        User {
            id,
            login: self.login,
            email: self.email,
            phone_number: self.phone_number,
            password: self.password,
            username: self.username,
        }
    }
}
