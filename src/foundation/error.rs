/// Convenience result type used across Drape.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Top-level error taxonomy used by engine and gateway APIs.
///
/// Selection misses and stale background-removal results are not errors and never
/// show up here; the store and controller treat them as silent no-ops.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// Invalid caller-provided data (unknown catalog item, category mismatch, bad config).
    #[error("validation error: {0}")]
    Validation(String),

    /// Persisted composition data violates an integrity rule.
    #[error("malformed composition: {0}")]
    Malformed(String),

    /// A persisted composition or asset does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An external collaborator (storage, inference) failed.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// A save was requested while another save for the same session is outstanding.
    #[error("save already in progress")]
    SaveInFlight,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrapeError::Malformed`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Build a [`DrapeError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`DrapeError::Gateway`] value.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Build a [`DrapeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for failures that leave a composition unloadable because its data is bad,
    /// as opposed to the backing store being unreachable.
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Serde(_))
    }
}

impl From<serde_json::Error> for DrapeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
