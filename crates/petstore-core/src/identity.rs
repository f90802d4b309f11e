//! Authenticated caller identity.
//!
//! An [`Identity`] is only ever produced from a verified access token;
//! handlers receive it explicitly and pass it down to the services that
//! stamp audit metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PetstoreError, PetstoreResult};

/// A role granted to a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Authority {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Admin => "ROLE_ADMIN",
            Authority::User => "ROLE_USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ROLE_ADMIN" => Some(Authority::Admin),
            "ROLE_USER" => Some(Authority::User),
            _ => None,
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub login: String,
    pub authorities: Vec<Authority>,
}

impl Identity {
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }

    /// Fails with [`PetstoreError::Forbidden`] unless the identity holds `authority`.
    pub fn require(&self, authority: Authority) -> PetstoreResult<()> {
        if self.has_authority(authority) {
            Ok(())
        } else {
            Err(PetstoreError::Forbidden {
                reason: format!("{} requires {authority}", self.login),
            })
        }
    }
}
