use serde::{Deserialize, Serialize};

use crate::users::repo_types::RolesPatch;

/// Request body for user creation.
#[derive(Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Option<RolesPatch>,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Request body for a partial update. Passwords are not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Option<RolesPatch>,
}

/// Acknowledgement returned by delete.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}
