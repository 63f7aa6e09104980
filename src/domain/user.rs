use serde::{Deserialize, Serialize};

use super::{null_as_default, pick_id};

/// The signed-in customer or admin, as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawUser")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
    pub phone_number: String,
    pub address: String,
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    profile_photo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    address: String,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        Ok(Self {
            id: pick_id(raw.id, raw.mongo_id).ok_or("user without an id")?,
            name: raw.name,
            email: raw.email,
            role: raw
                .role
                .filter(|role| !role.is_empty())
                .unwrap_or_else(|| "user".to_string()),
            avatar: raw.profile_photo.or(raw.avatar),
            phone_number: raw.phone_number,
            address: raw.address,
            created_at: raw.created_at,
        })
    }
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Credentials for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Acknowledgement from the password-reset and email-verification endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthNotice {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
