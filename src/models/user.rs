//! Authenticated user claims and the catalog permission gate

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Named permissions understood by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// Create, update and delete catalog records; renew loans; see every loan
    ManageCatalog,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageCatalog => "catalog.can_mark_returned",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog.can_mark_returned" => Ok(Permission::ManageCatalog),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    /// Permission names granted to the user
    #[serde(default)]
    pub permissions: Vec<String>,
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

    /// Ask the permission subsystem whether `name` is granted
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission.as_str()) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission {}",
                permission
            )))
        }
    }

    /// Gate for every mutating catalog handler and the librarian views
    pub fn require_manage_catalog(&self) -> Result<(), AppError> {
        self.require(Permission::ManageCatalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn claims(permissions: &[&str]) -> UserClaims {
        let now = Utc::now();
        UserClaims {
            sub: "patron".to_string(),
            user_id: 7,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        }
    }

    #[test]
    fn manage_permission_is_required() {
        assert!(claims(&[]).require_manage_catalog().is_err());
        assert!(claims(&["catalog.other"]).require_manage_catalog().is_err());
        assert!(claims(&["catalog.can_mark_returned"])
            .require_manage_catalog()
            .is_ok());
    }

    #[test]
    fn denial_is_an_authorization_error() {
        match claims(&[]).require_manage_catalog() {
            Err(AppError::Authorization(msg)) => assert!(msg.contains("catalog.can_mark_returned")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn token_round_trip_keeps_permissions() {
        let original = claims(&["catalog.can_mark_returned"]);
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert!(parsed.has_permission("catalog.can_mark_returned"));
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn permission_names_parse() {
        assert_eq!(
            "catalog.can_mark_returned".parse::<Permission>(),
            Ok(Permission::ManageCatalog)
        );
        assert!("catalog.nope".parse::<Permission>().is_err());
    }
}
