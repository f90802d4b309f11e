//! Pet domain model.
//!
//! A pet's `status` is the only piece of state the ordering workflow
//! reads and mutates: orders may only be placed against
//! [`PetStatus::Available`] pets, and a successful order moves the pet
//! to [`PetStatus::Sold`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::audit::AuditInfo;
use crate::error::PetstoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl PetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetStatus {
    type Err = PetstoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(PetStatus::Available),
            "pending" => Ok(PetStatus::Pending),
            "sold" => Ok(PetStatus::Sold),
            other => Err(PetstoreError::invalid(format!(
                "unknown pet status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub status: PetStatus,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    /// Ordered; uploads append to the end.
    pub photo_urls: Vec<String>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Pet {
    pub fn is_orderable(&self) -> bool {
        self.status == PetStatus::Available
    }
}

/// Fields required to create a new pet.
///
/// A missing status defaults to [`PetStatus::Available`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePet {
    pub name: String,
    pub status: Option<PetStatus>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    pub photo_urls: Vec<String>,
}

/// Fields that can be updated on an existing pet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePet {
    pub name: Option<String>,
    pub status: Option<PetStatus>,
    /// `Some(Some(id))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "explicit_null")]
    pub category_id: Option<Option<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub photo_urls: Option<Vec<String>>,
}

/// Reads a present field (including `null`) as `Some`, so that only an
/// absent field becomes `None`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("available".parse::<PetStatus>().unwrap(), PetStatus::Available);
        assert_eq!(" Pending ".parse::<PetStatus>().unwrap(), PetStatus::Pending);
        assert_eq!("SOLD".parse::<PetStatus>().unwrap(), PetStatus::Sold);
    }

    #[test]
    fn unknown_status_is_invalid_request() {
        let err = "adopted".parse::<PetStatus>().unwrap_err();
        assert!(matches!(err, PetstoreError::InvalidRequest(_)));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&PetStatus::Sold).unwrap();
        assert_eq!(json, "\"sold\"");
    }

    #[test]
    fn null_category_clears_and_absent_keeps() {
        let clear: UpdatePet = serde_json::from_str(r#"{"categoryId":null}"#).unwrap();
        assert_eq!(clear.category_id, Some(None));

        let keep: UpdatePet = serde_json::from_str(r#"{"name":"rex"}"#).unwrap();
        assert_eq!(keep.category_id, None);
    }
}
