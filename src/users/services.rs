use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::users::{
    dto::{CreateUserRequest, UpdateUserRequest},
    password::hash_password,
    repo::UserStore,
    repo_types::{NewUser, User},
    validation::{validate_create, validate_update},
};

/// Identifiers the store cannot parse surface as persistence failures.
fn parse_id(raw: &str) -> UserResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|e| {
        debug!(id = raw, error = %e, "malformed user id");
        UserError::Persistence(format!("malformed user id '{raw}'"))
    })
}

/// The user directory. Holds no state of its own beyond the store handle.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateUserRequest) -> UserResult<User> {
        let valid = validate_create(input)?;
        let password_hash = hash_password(&valid.password)?;

        let user = self
            .store
            .insert(NewUser {
                username: valid.username,
                email: valid.email,
                password_hash,
                roles: valid.roles,
            })
            .await
            .inspect_err(|e| warn!(error = %e, "create user rejected"))?;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn get(&self, id: &str) -> UserResult<User> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn update(&self, id: &str, input: UpdateUserRequest) -> UserResult<User> {
        let changes = validate_update(input)?;
        let id = parse_id(id)?;

        let user = self
            .store
            .update(id, changes)
            .await
            .inspect_err(|e| warn!(user_id = %id, error = %e, "update user rejected"))?
            .ok_or(UserError::NotFound(id))?;

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> UserResult<()> {
        let id = parse_id(id)?;
        if !self.store.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
