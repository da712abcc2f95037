use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored user record
///
/// Created the first time an external credential is verified. Later sign-ins
/// only refresh the display fields (`name`, `email`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub provider: String,
    #[serde(skip_serializing)]
    pub provider_subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The resolved caller of a request
///
/// Only the session validator produces one, so holding a `UserIdentity`
/// means the bearer token was checked and the user exists.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Profile returned by an identity provider after it verified a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub name: String,
}
