/// Category of a store error. Lets the registry tell a uniqueness
/// violation apart from an I/O fault without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid connection string or store options, fatal at startup.
    Config,
    /// I/O failure, backend unreachable or query timed out.
    Io,
    /// Persisted data could not be encoded or decoded.
    Format,
    /// Unique index violation (another record already owns the key).
    Duplicate,
    /// Logical error (invalid state, generic).
    Logic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Duplicate => f.write_str("duplicate"),
            ErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Error returned by every `TopicStore` method.
///
/// Carries an `ErrorKind` for categorization and a human-readable message.
/// `From` impls assign the kind automatically so backends can use `?`.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: ErrorKind,
    message: String,
}

impl StoreError {
    /// Generic logic error (default kind).
    pub fn new(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn format_err(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    /// Unique index on `field` already holds `value`.
    pub fn duplicate(field: &str, value: &str) -> Self {
        Self {
            kind: ErrorKind::Duplicate,
            message: format!("duplicate key: {field} '{value}' already exists"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_duplicate(&self) -> bool {
        self.kind == ErrorKind::Duplicate
    }

    /// Prepend context, keeping the kind: `"context: original message"`.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self { Self::io(e.to_string()) }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self { Self::format_err(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_kind() {
        let err: StoreError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.message(), "disk gone");
    }

    #[test]
    fn context_is_prepended_and_kind_preserved() {
        let err = StoreError::duplicate("topic", "orders").with_context("insert");
        assert!(err.is_duplicate());
        assert_eq!(err.to_string(), "insert: duplicate key: topic 'orders' already exists");
        assert_eq!(format!("{err:?}"), "[duplicate] insert: duplicate key: topic 'orders' already exists");
    }
}
