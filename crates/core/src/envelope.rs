//! Uniform response envelope and the one place that knows which payload shapes
//! the backend may use for a collection of siblings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
    pub data: T,
}

impl Envelope<Value> {
    /// Decode a raw response body. A missing `data` field decodes as `null`.
    pub fn from_body(body: Value) -> Result<Self, SyncError> {
        #[derive(Deserialize)]
        struct Raw {
            success: bool,
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            code: Option<i64>,
            #[serde(default)]
            data: Value,
        }

        let raw: Raw = serde_json::from_value(body)
            .map_err(|err| SyncError::ShapeMismatch(format!("malformed response envelope: {err}")))?;
        Ok(Self {
            success: raw.success,
            message: raw.message.unwrap_or_default(),
            code: raw.code,
            data: raw.data,
        })
    }

    /// Unwrap `data`, turning `success: false` into [`SyncError::Rejected`].
    pub fn into_data(self, default_message: &str) -> Result<Value, SyncError> {
        if self.success {
            return Ok(self.data);
        }
        let message = self.message.trim();
        Err(SyncError::Rejected(if message.is_empty() {
            default_message.to_string()
        } else {
            message.to_string()
        }))
    }
}

/// Endpoint families and the field names under which each may wrap its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFamily {
    ListGroups,
    TaskGroups,
    Tasks,
}

impl EnvelopeFamily {
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            EnvelopeFamily::ListGroups => &["listGroup", "listGroups"],
            EnvelopeFamily::TaskGroups => &["taskGroups", "taskGroup", "groups"],
            EnvelopeFamily::Tasks => &["tasks", "list"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnvelopeFamily::ListGroups => "list groups",
            EnvelopeFamily::TaskGroups => "task groups",
            EnvelopeFamily::Tasks => "tasks",
        }
    }
}

/// Reduce any accepted shape to one ordered sequence, or `None` on mismatch.
pub fn normalize<T: DeserializeOwned>(raw: &Value, family: EnvelopeFamily) -> Option<Vec<T>> {
    let sequence = match raw {
        Value::Array(_) => raw,
        Value::Object(map) => family
            .fields()
            .iter()
            .find_map(|field| map.get(*field).filter(|value| value.is_array()))?,
        _ => return None,
    };

    match serde_json::from_value(sequence.clone()) {
        Ok(items) => Some(items),
        Err(err) => {
            tracing::debug!(family = family.label(), error = %err, "sequence elements failed to decode");
            None
        }
    }
}

/// [`normalize`] for call sites that must fail on a mismatch.
pub fn expect_sequence<T: DeserializeOwned>(
    raw: &Value,
    family: EnvelopeFamily,
    operation: &str,
) -> Result<Vec<T>, SyncError> {
    normalize(raw, family).ok_or_else(|| {
        SyncError::ShapeMismatch(format!(
            "{operation}: response is missing {}",
            family.label()
        ))
    })
}
