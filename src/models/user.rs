//! User accounts, permission groups and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Group every profile owner joins
pub const LIBRARY_MEMBER_GROUP: &str = "Library Member";

/// Permission codenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create, update and delete authors
    CanCrudAuthors,
    /// Create, update and delete books
    CanCrudBooks,
    /// Set book as returned
    CanMarkReturned,
    /// This user is a Librarian
    IsLibrarian,
    /// This user is a Library Member
    IsLibraryMember,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::CanCrudAuthors,
        Permission::CanCrudBooks,
        Permission::CanMarkReturned,
        Permission::IsLibrarian,
        Permission::IsLibraryMember,
    ];

    pub fn codename(&self) -> &'static str {
        match self {
            Permission::CanCrudAuthors => "can_crud_authors",
            Permission::CanCrudBooks => "can_crud_books",
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::IsLibrarian => "is_librarian",
            Permission::IsLibraryMember => "is_library_member",
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.codename() == s)
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

/// User account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

/// Current user with resolved permissions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
    pub groups: Vec<String>,
    pub permissions: Vec<Permission>,
    /// Slug of the user's profile, if one exists
    pub profile_slug: Option<String>,
}

/// Sign-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Replace the groups of a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGroups {
    /// Group names, e.g. "Librarian" or "Library Member"
    pub groups: Vec<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Superusers hold every permission
    pub fn has_perm(&self, perm: Permission) -> bool {
        self.is_superuser || self.permissions.contains(&perm)
    }

    pub fn require(&self, perm: Permission) -> Result<(), AppError> {
        if self.has_perm(perm) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                perm.codename()
            )))
        }
    }

    pub fn require_crud_authors(&self) -> Result<(), AppError> {
        self.require(Permission::CanCrudAuthors)
    }

    pub fn require_crud_books(&self) -> Result<(), AppError> {
        self.require(Permission::CanCrudBooks)
    }

    pub fn require_mark_returned(&self) -> Result<(), AppError> {
        self.require(Permission::CanMarkReturned)
    }

    pub fn require_superuser(&self) -> Result<(), AppError> {
        if self.is_superuser {
            Ok(())
        } else {
            Err(AppError::Authorization("Superuser privileges required".to_string()))
        }
    }

    pub fn is_librarian(&self) -> bool {
        self.has_perm(Permission::IsLibrarian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Vec<Permission>, is_superuser: bool) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "marian".to_string(),
            user_id: 4,
            is_superuser,
            permissions,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_member_permissions() {
        let member = claims(vec![Permission::IsLibraryMember], false);
        assert!(member.has_perm(Permission::IsLibraryMember));
        assert!(member.require_crud_books().is_err());
        assert!(member.require_mark_returned().is_err());
        assert!(!member.is_librarian());
        assert!(member.require_superuser().is_err());
    }

    #[test]
    fn test_superuser_has_everything() {
        let admin = claims(vec![], true);
        for perm in Permission::ALL {
            assert!(admin.require(perm).is_ok());
        }
        assert!(admin.require_superuser().is_ok());
    }

    #[test]
    fn test_token_round_trip() {
        let original = claims(vec![Permission::CanCrudAuthors, Permission::IsLibrarian], false);
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 4);
        assert_eq!(parsed.permissions, original.permissions);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_codenames_parse() {
        for perm in Permission::ALL {
            assert_eq!(perm.codename().parse::<Permission>().unwrap(), perm);
        }
        assert_eq!(
            serde_json::to_string(&Permission::CanMarkReturned).unwrap(),
            "\"can_mark_returned\""
        );
        assert!("is_wizard".parse::<Permission>().is_err());
    }
}
