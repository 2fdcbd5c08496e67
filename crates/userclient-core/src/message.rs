//! Change notifications published by the user service.
//!
//! On the wire a notification is a single string of exactly three
//! colon-separated fields, for example `user:updated:8f14e45f`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UserClientError;

/// A parsed change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Component that emitted the event, e.g. `user`.
    pub source: String,
    /// What happened, e.g. `updated`.
    pub event: String,
    /// Event argument, usually an id.
    pub payload: String,
}

impl Message {
    /// Parses the `source:event:payload` wire form.
    ///
    /// # Errors
    ///
    /// Returns [`UserClientError::Malformed`] unless the input splits into
    /// exactly three fields.
    pub fn parse(raw: &str) -> Result<Self, UserClientError> {
        let mut parts = raw.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(source), Some(event), Some(payload), None) => Ok(Self {
                source: source.to_string(),
                event: event.to_string(),
                payload: payload.to_string(),
            }),
            _ => Err(UserClientError::malformed(format!(
                "expected source:event:payload, got {raw:?}"
            ))),
        }
    }
}

impl FromStr for Message {
    type Err = UserClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.event, self.payload)
    }
}
