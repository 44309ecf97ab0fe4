use tns_api::StoreError;

/// Which side of the request is at fault. The transport maps this to a
/// status code; the registry never deals with HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Server,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),

    #[error("Duplicated Topic")]
    DuplicateTopic { topic: String },

    /// `key` renders as `topic 'x'` or `id '...'`.
    #[error("{key} not found")]
    NotFound { key: String },

    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error("storage: {0}")]
    Storage(StoreError),
}

impl RegistryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RegistryError::Storage(_) => ErrorClass::Server,
            _ => ErrorClass::Client,
        }
    }

    pub(crate) fn not_found(key: impl std::fmt::Display) -> Self {
        RegistryError::NotFound { key: key.to_string() }
    }
}
