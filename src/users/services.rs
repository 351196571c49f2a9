use std::sync::Arc;

use crate::error::UserError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User};

/// Sits between the handlers and the store. Currently forwards every call
/// unchanged; business rules (normalization, cross-field uniqueness) go here.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, user: NewUser) -> Result<User, UserError> {
        self.store.create(user).await
    }

    pub async fn get(&self, login: &str) -> Result<User, UserError> {
        self.store.find_by_login(login).await
    }
}
