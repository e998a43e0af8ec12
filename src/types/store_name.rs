// ABOUTME: Store name validation.
// ABOUTME: Names are DNS-safe slugs because they end up in hostnames and workload names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreNameError {
    #[error("store name cannot be empty")]
    Empty,

    #[error("store name must be at least {MIN_NAME_LEN} characters")]
    TooShort,

    #[error("store name exceeds maximum length of {MAX_NAME_LEN} characters")]
    TooLong,

    #[error("store name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("store name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("store name must be lowercase")]
    NotLowercase,

    #[error("invalid character in store name: '{0}'")]
    InvalidChar(char),
}

/// User-chosen store slug: lowercase alphanumerics and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreName(String);

impl StoreName {
    pub fn new(value: &str) -> Result<Self, StoreNameError> {
        if value.is_empty() {
            return Err(StoreNameError::Empty);
        }

        if value.len() < MIN_NAME_LEN {
            return Err(StoreNameError::TooShort);
        }

        if value.len() > MAX_NAME_LEN {
            return Err(StoreNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(StoreNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(StoreNameError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(StoreNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(StoreNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoreName {
    type Err = StoreNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for StoreName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StoreName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StoreName::new(&s).map_err(serde::de::Error::custom)
    }
}
