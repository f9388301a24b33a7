//! Resource IRI type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A server-relative resource identifier, as found in `@id` fields.
///
/// Format: `/api/3/<module>/<uuid>`; the last segment identifies the record.
///
/// # Example
///
/// ```
/// use fsr_core::Iri;
///
/// let iri = Iri::new("/api/3/export_templates/6a2f0d1e-33b4").unwrap();
/// assert_eq!(iri.uuid(), "6a2f0d1e-33b4");
/// assert_eq!(iri.module(), Some("export_templates"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Iri(String);

impl Iri {
    /// Create an IRI, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a server-relative path with a
    /// non-empty final segment.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        if !s.starts_with('/') {
            return Err(InvalidInputError::Iri {
                value: s.to_string(),
                reason: "must start with '/'".to_string(),
            }
            .into());
        }
        if s.ends_with('/') || s.len() == 1 {
            return Err(InvalidInputError::Iri {
                value: s.to_string(),
                reason: "must end with a record identifier".to_string(),
            }
            .into());
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the final path segment (the record UUID).
    pub fn uuid(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Returns the module segment preceding the UUID, if any.
    pub fn module(&self) -> Option<&str> {
        let mut segments = self.0.rsplit('/');
        segments.next();
        segments.next().filter(|s| !s.is_empty())
    }

    /// Returns the IRI as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Iri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Iri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Iri::new(&s).map_err(serde::de::Error::custom)
    }
}
