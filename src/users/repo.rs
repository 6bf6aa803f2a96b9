use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::users::repo_types::{NewUser, User, UserChanges, UserRow};

/// Persistence seam for user records. Implementations enforce uniqueness of
/// `username` and `email` and apply each mutation atomically.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new record, assigning id and timestamps.
    async fn insert(&self, user: NewUser) -> UserResult<User>;

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Apply `changes` and refresh `updated_at`. `None` if no such record.
    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<Option<User>>;

    /// Remove the record. `false` if no such record.
    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Attribute a unique-constraint name to the field it guards.
pub(crate) fn conflict_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint? {
        "users_username_key" => Some("username"),
        "users_email_key" => Some("email"),
        _ => None,
    }
}

fn map_write_error(e: sqlx::Error, username: Option<&str>, email: Option<&str>) -> UserError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let value = match conflict_field(db.constraint()) {
                Some("username") => username.map(|v| ("username", v)),
                Some("email") => email.map(|v| ("email", v)),
                _ => None,
            };
            if let Some((field, value)) = value {
                return UserError::Conflict {
                    field,
                    value: value.to_string(),
                };
            }
        }
    }
    UserError::from(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> UserResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_seller, is_customer, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, password_hash, is_seller, is_customer, is_admin,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.roles.is_seller)
        .bind(user.roles.is_customer)
        .bind(user.roles.is_admin)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, Some(&user.username), Some(&user.email)))?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, is_seller, is_customer, is_admin,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username    = COALESCE($2, username),
                email       = COALESCE($3, email),
                is_seller   = COALESCE($4, is_seller),
                is_customer = COALESCE($5, is_customer),
                is_admin    = COALESCE($6, is_admin),
                updated_at  = clock_timestamp()
            WHERE id = $1
            RETURNING id, username, email, password_hash, is_seller, is_customer, is_admin,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.roles.is_seller)
        .bind(changes.roles.is_customer)
        .bind(changes.roles.is_admin)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_error(e, changes.username.as_deref(), changes.email.as_deref()))?;
        Ok(row.map(User::from))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_fields() {
        assert_eq!(conflict_field(Some("users_username_key")), Some("username"));
        assert_eq!(conflict_field(Some("users_email_key")), Some("email"));
        assert_eq!(conflict_field(Some("users_pkey")), None);
        assert_eq!(conflict_field(None), None);
    }

    #[test]
    fn non_database_errors_are_persistence() {
        let err = map_write_error(sqlx::Error::RowNotFound, Some("ankit"), None);
        assert!(matches!(err, UserError::Persistence(_)));
    }
}
