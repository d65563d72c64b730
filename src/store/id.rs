use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EldenDataError, EldenDataResult};

/// Store-assigned document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a client-supplied identifier.
    pub fn parse(raw: &str) -> EldenDataResult<Self> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| EldenDataError::invalid_identifier(format!("'{}' is not a valid document id", raw)))
    }

    /// Rebuilds an identifier from its 16 stored bytes.
    pub fn from_slice(bytes: &[u8]) -> EldenDataResult<Self> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|e| EldenDataError::store_unavailable(format!("corrupt stored id: {}", e)))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = EldenDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
