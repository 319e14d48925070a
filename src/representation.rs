//! Requested level of detail for returned entities.
//!
//! The dispatcher never interprets a representation; it carries it inside the
//! [`RequestContext`](crate::RequestContext) so handlers can honour it.

use crate::error::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response verbosity requested by the client through the `v` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Minimal reference: identifier and display string
    Ref,
    /// The handler's default view
    Default,
    /// Every property, including audit information
    Full,
    /// Caller-selected properties, e.g. `custom:(uuid,name)`
    Custom(String),
}

impl Representation {
    const CUSTOM_PREFIX: &'static str = "custom:";

    /// Property names listed in a custom representation.
    ///
    /// Returns an empty list for the predefined representations.
    pub fn custom_fields(&self) -> Vec<&str> {
        match self {
            Self::Custom(spec) => spec
                .trim()
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, Self::Ref)
    }
}

impl Default for Representation {
    fn default() -> Self {
        Self::Ref
    }
}

impl FromStr for Representation {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let lower = value.to_ascii_lowercase();
        match lower.as_str() {
            "ref" => Ok(Self::Ref),
            "default" => Ok(Self::Default),
            "full" => Ok(Self::Full),
            _ if lower.starts_with(Self::CUSTOM_PREFIX) => {
                let spec = &value[Self::CUSTOM_PREFIX.len()..];
                if spec.trim().trim_matches(|c| c == '(' || c == ')').trim().is_empty() {
                    return Err(DispatchError::bad_request(
                        "custom representation must list at least one property",
                    ));
                }
                Ok(Self::Custom(spec.to_string()))
            }
            _ => Err(DispatchError::bad_request(format!(
                "unknown representation '{}'",
                value
            ))),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref => write!(f, "ref"),
            Self::Default => write!(f, "default"),
            Self::Full => write!(f, "full"),
            Self::Custom(spec) => write!(f, "{}{}", Self::CUSTOM_PREFIX, spec),
        }
    }
}
