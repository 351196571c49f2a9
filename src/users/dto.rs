use serde::Deserialize;

use crate::error::UserError;
use crate::users::repo_types::NewUser;

/// Request body for `POST /api/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub login: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub username: String,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = UserError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        if req.login.trim().is_empty() {
            return Err(UserError::Validation("login is required".into()));
        }
        if req.password.is_empty() {
            return Err(UserError::Validation("password is required".into()));
        }
        Ok(NewUser {
            login: req.login,
            email: req.email,
            phone_number: req.phone_number,
            password: req.password,
            username: req.username,
        })
    }
}
