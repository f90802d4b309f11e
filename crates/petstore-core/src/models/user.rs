//! User domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditInfo;
use crate::identity::Authority;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub activated: bool,
    pub authorities: Vec<Authority>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub login: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub activated: bool,
    pub authorities: Vec<Authority>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    /// Raw password; re-hashed when present.
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub activated: Option<bool>,
    pub authorities: Option<Vec<Authority>>,
}
