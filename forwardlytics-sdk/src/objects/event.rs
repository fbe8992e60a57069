//! The identify event and its validation rule.

use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Names of the required fields an [`Event`] is missing, in validation order.
pub type MissingParameters = SmallVec<[&'static str; 3]>;

/// One identify action for a user.
///
/// Every field decodes to its zero value when absent or `null` so that
/// validation, not deserialization, decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "userID", default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(rename = "userTraits", default, deserialize_with = "null_as_default")]
    pub user_traits: HashMap<String, String>,
    /// Epoch seconds at which the event happened, supplied by the caller.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    /// Epoch seconds at which the server began handling the request.
    ///
    /// Always stamped by the server; a caller-supplied value is replaced.
    #[serde(rename = "receivedAt", default, deserialize_with = "null_as_default")]
    pub received_at: i64,
}

impl Event {
    /// Create an event with no traits and no receive stamp.
    pub fn new(user_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp,
            ..Default::default()
        }
    }

    /// Add a trait, replacing any previous value under the same name.
    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_traits.insert(name.into(), value.into());
        self
    }

    /// List the required fields this event lacks.
    ///
    /// The order is always `userID`, `timestamp`, `receivedAt`. An empty result
    /// means the event is valid.
    pub fn validate(&self) -> MissingParameters {
        let mut missing = MissingParameters::new();
        if self.user_id.is_empty() {
            missing.push("userID");
        }
        if self.timestamp == 0 {
            missing.push("timestamp");
        }
        if self.received_at == 0 {
            missing.push("receivedAt");
        }
        missing
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
