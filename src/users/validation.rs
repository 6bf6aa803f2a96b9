//! Field rules shared by create and update. Pure functions; nothing here
//! touches the store.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{UserError, UserResult};
use crate::users::dto::{CreateUserRequest, UpdateUserRequest};
use crate::users::repo_types::{Roles, UserChanges};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn check_username(username: &str) -> UserResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(UserError::Validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(())
}

pub fn check_email(email: &str) -> UserResult<()> {
    if !is_valid_email(email) {
        return Err(UserError::Validation(
            "email must be a valid email address".into(),
        ));
    }
    Ok(())
}

pub fn check_password(password: &str) -> UserResult<()> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(UserError::Validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

/// Create input after validation. Fields are kept exactly as given; roles
/// have defaults merged in.
#[derive(Clone)]
pub struct ValidCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Roles,
}

impl std::fmt::Debug for ValidCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidCreate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

pub fn validate_create(req: CreateUserRequest) -> UserResult<ValidCreate> {
    check_username(&req.username)?;
    check_email(&req.email)?;
    check_password(&req.password)?;

    Ok(ValidCreate {
        username: req.username,
        email: req.email,
        password: req.password,
        roles: req.roles.unwrap_or_default().apply(Roles::default()),
    })
}

pub fn validate_update(req: UpdateUserRequest) -> UserResult<UserChanges> {
    if let Some(username) = &req.username {
        check_username(username)?;
    }
    if let Some(email) = &req.email {
        check_email(email)?;
    }

    Ok(UserChanges {
        username: req.username,
        email: req.email,
        roles: req.roles.unwrap_or_default(),
    })
}
