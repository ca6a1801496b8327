use serde::{Deserialize, Serialize};
use std::fmt;

/// Names the persisted snapshot for one logical list. Used verbatim as a
/// file stem by the file-backed store, so path separators are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheNamespace(String);

impl CacheNamespace {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Cache namespace cannot be empty".to_string());
        }
        if value.contains('/') || value.contains('\\') || value.contains("..") {
            return Err(format!("Cache namespace cannot contain path segments: {value}"));
        }
        Ok(())
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CacheNamespace> for String {
    fn from(value: CacheNamespace) -> Self {
        value.0
    }
}
