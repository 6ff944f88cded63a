// ABOUTME: Compose service name validation.
// ABOUTME: Names follow RFC 1123 label rules so color suffixes stay valid.

use super::Color;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Longest base name that still fits a label once `-green` is appended.
const MAX_BASE_LEN: usize = 63 - "-green".len();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name exceeds maximum length of 57 characters")]
    TooLong,

    #[error("service name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("service name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("service name must be lowercase")]
    NotLowercase,

    #[error("invalid character in service name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        if value.is_empty() {
            return Err(ServiceNameError::Empty);
        }

        if value.len() > MAX_BASE_LEN {
            return Err(ServiceNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(ServiceNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(ServiceNameError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(ServiceNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(ServiceNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Name from a literal known to pass validation.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(Self::new(value).is_ok(), "invalid service name literal {value:?}");
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The colored variant of this service, e.g. `backend` -> `backend-green`.
    pub fn with_color(&self, color: Color) -> ServiceName {
        ServiceName(format!("{}-{}", self.0, color))
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceName::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compose_style_names() {
        assert!(ServiceName::new("backend").is_ok());
        assert!(ServiceName::new("web-ui2").is_ok());
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(ServiceName::new(""), Err(ServiceNameError::Empty));
        assert_eq!(
            ServiceName::new("-api"),
            Err(ServiceNameError::StartsWithHyphen)
        );
        assert_eq!(ServiceName::new("Api"), Err(ServiceNameError::NotLowercase));
        assert_eq!(
            ServiceName::new("api_v2"),
            Err(ServiceNameError::InvalidChar('_'))
        );
    }

    #[test]
    fn colored_name_fits_label_limit() {
        let base = ServiceName::new(&"a".repeat(MAX_BASE_LEN)).unwrap();
        assert_eq!(base.with_color(Color::Green).as_str().len(), 63);
        assert_eq!(
            ServiceName::new(&"a".repeat(MAX_BASE_LEN + 1)),
            Err(ServiceNameError::TooLong)
        );
    }

    #[test]
    fn from_static_matches_validated_name() {
        for literal in ["backend", "webui", "router"] {
            assert_eq!(ServiceName::from_static(literal), ServiceName::new(literal).unwrap());
        }
    }

    #[test]
    fn with_color_appends_suffix() {
        let name = ServiceName::new("webui").unwrap();
        assert_eq!(name.with_color(Color::Blue).as_str(), "webui-blue");
    }
}
