//! Owner identities for listings. Authentication and sessions live outside
//! this service; the directory only answers who an account is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for publisher and administrator accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Separate identity kinds backing the two sign-in guards of the original
/// product surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Publisher,
    Administrator,
}

impl AccountRole {
    pub const fn label(self) -> &'static str {
        match self {
            AccountRole::Publisher => "publisher",
            AccountRole::Administrator => "administrator",
        }
    }
}

/// One-to-one profile row attached to every account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub role: AccountRole,
    pub display_name: String,
}

/// Read-side lookup so the listing service can resolve owners without owning
/// identity storage.
pub trait AccountDirectory: Send + Sync {
    fn fetch(&self, id: &AccountId) -> Result<Option<AccountProfile>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("account directory unavailable: {0}")]
    Unavailable(String),
}
