use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Role flags carried by every user. Independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roles {
    pub is_seller: bool,
    pub is_customer: bool,
    pub is_admin: bool,
}

impl Default for Roles {
    fn default() -> Self {
        Self {
            is_seller: false,
            is_customer: true,
            is_admin: false,
        }
    }
}

/// Any subset of the role flags, as supplied by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RolesPatch {
    pub is_seller: Option<bool>,
    pub is_customer: Option<bool>,
    pub is_admin: Option<bool>,
}

impl RolesPatch {
    /// Overlay the supplied flags on `base`; unset flags keep `base`'s value.
    pub fn apply(self, base: Roles) -> Roles {
        Roles {
            is_seller: self.is_seller.unwrap_or(base.is_seller),
            is_customer: self.is_customer.unwrap_or(base.is_customer),
            is_admin: self.is_admin.unwrap_or(base.is_admin),
        }
    }
}

/// User record as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    pub roles: Roles,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated input for a store insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Roles,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: RolesPatch,
}

impl UserChanges {
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        user.roles = self.roles.apply(user.roles);
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_seller: bool,
    pub is_customer: bool,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            roles: Roles {
                is_seller: r.is_seller,
                is_customer: r.is_customer,
                is_admin: r.is_admin,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_unset_flags() {
        let patch = RolesPatch {
            is_seller: Some(true),
            ..Default::default()
        };
        assert_eq!(
            patch.apply(Roles::default()),
            Roles {
                is_seller: true,
                is_customer: true,
                is_admin: false,
            }
        );
    }

    #[test]
    fn empty_patch_keeps_existing_flags() {
        let existing = Roles {
            is_seller: true,
            is_customer: false,
            is_admin: true,
        };
        assert_eq!(RolesPatch::default().apply(existing), existing);
    }

    #[test]
    fn serialized_user_omits_password_hash() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: "ankit".into(),
            email: "ankit@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            roles: Roles::default(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["roles"]["isCustomer"], true);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn roles_patch_rejects_non_boolean_flags() {
        let res: Result<RolesPatch, _> = serde_json::from_str(r#"{"isSeller":"yes"}"#);
        assert!(res.is_err());
    }
}
