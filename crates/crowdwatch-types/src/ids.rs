//! Type-safe identifier wrappers around [`String`].
//!
//! Zones and recommendations are keyed by short human-readable strings
//! (`zone-entrance-1`, `rec-001`). Wrapping them prevents a recommendation id
//! from being passed where a zone id is expected.

use serde::{Deserialize, Serialize};

/// Maximum length of a zone identifier in bytes.
pub const MAX_ZONE_ID_LEN: usize = 63;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier and return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a physical area whose crowd is measured.
    ///
    /// Comparison is byte-exact and case-sensitive. Valid ids are non-empty,
    /// at most [`MAX_ZONE_ID_LEN`] bytes, and contain no `/` so they fit in a
    /// single URL path segment.
    ZoneId
}

define_id! {
    /// Unique identifier of a staffing recommendation.
    #[derive(Deserialize)]
    RecommendationId
}

/// Reasons a string is rejected as a [`ZoneId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneIdError {
    /// The id is the empty string.
    #[error("zone id is empty")]
    Empty,

    /// The id exceeds [`MAX_ZONE_ID_LEN`] bytes.
    #[error("zone id is {len} bytes, limit is {MAX_ZONE_ID_LEN}")]
    TooLong {
        /// Actual length in bytes.
        len: usize,
    },

    /// The id contains a path separator.
    #[error("zone id contains '/'")]
    ContainsSlash,
}

impl ZoneId {
    /// Validate and wrap a zone identifier.
    pub fn parse(raw: &str) -> Result<Self, ZoneIdError> {
        if raw.is_empty() {
            return Err(ZoneIdError::Empty);
        }
        if raw.len() > MAX_ZONE_ID_LEN {
            return Err(ZoneIdError::TooLong { len: raw.len() });
        }
        if raw.contains('/') {
            return Err(ZoneIdError::ContainsSlash);
        }
        Ok(Self(raw.to_owned()))
    }
}

impl TryFrom<String> for ZoneId {
    type Error = ZoneIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)?;
        Ok(Self(raw))
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl core::str::FromStr for ZoneId {
    type Err = ZoneIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl RecommendationId {
    /// Wrap a recommendation identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}
