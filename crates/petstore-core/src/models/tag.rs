//! Tag domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: Option<String>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTag {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTag {
    pub name: Option<String>,
}
