//! Audit metadata stamped on every persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SYSTEM_ACTOR: &str = "system";

/// Who created and last modified a record, and when.
///
/// The `*_by` fields hold the login of the acting user, or
/// [`SYSTEM_ACTOR`] for records written outside a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_by: String,
    pub last_modified_date: DateTime<Utc>,
}

impl AuditInfo {
    /// Fresh audit stamp for a record created now by `actor`.
    pub fn new(actor: &str) -> Self {
        let now = Utc::now();
        Self {
            created_by: actor.to_string(),
            created_date: now,
            last_modified_by: actor.to_string(),
            last_modified_date: now,
        }
    }
}
