use std::fmt;

// === BarError ===

/// Errors raised by bar and bookmark mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum BarError {
    /// No bar with the given ID exists.
    BarNotFound(String),
    /// The bookmark is not in the given bar.
    BookmarkNotFound(String),
    /// Refused to delete the only remaining bar.
    LastBar,
    /// The URL is not an absolute http/https URL.
    InvalidUrl(String),
}

impl BarError {
    /// True for references that went stale through a concurrent change.
    ///
    /// These are swallowed silently; every other variant is shown to the user.
    pub fn is_stale(&self) -> bool {
        matches!(self, BarError::BarNotFound(_) | BarError::BookmarkNotFound(_))
    }
}

impl fmt::Display for BarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarError::BarNotFound(id) => write!(f, "Bar not found: {}", id),
            BarError::BookmarkNotFound(id) => write!(f, "Bookmark not found: {}", id),
            BarError::LastBar => write!(f, "You must have at least one bookmark bar"),
            BarError::InvalidUrl(url) => write!(
                f,
                "Please enter a valid URL (starting with http:// or https://): {}",
                url
            ),
        }
    }
}

impl std::error::Error for BarError {}

// === StorageError ===

/// Errors from the key-value storage areas.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The backing store cannot be reached.
    Unavailable(String),
    /// A stored value could not be encoded or decoded.
    Serialization(String),
    /// The SQLite backend failed.
    Database(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Storage serialization error: {}", msg),
            StorageError::Database(msg) => write!(f, "Storage database error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

// === ConfigError ===

/// Errors related to the host configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    IoError(String),
    /// Failed to serialize or deserialize config data.
    SerializationError(String),
    /// The config key path does not exist.
    InvalidKey(String),
    /// The value has the wrong type for its key.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidKey(key) => write!(f, "Invalid config key: {}", key),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// === MessageError ===

/// Errors returned to the companion control surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageError {
    /// The message named an action this build does not know.
    UnknownAction(String),
    /// The message was not a valid command object.
    Malformed(String),
    /// Several bars exist and the message did not pick one.
    NoBarSelected,
    /// The command was understood but refused.
    Rejected(String),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::UnknownAction(action) => write!(f, "Unknown action: {}", action),
            MessageError::Malformed(msg) => write!(f, "Malformed message: {}", msg),
            MessageError::NoBarSelected => write!(f, "Choose a bar for this link"),
            MessageError::Rejected(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MessageError {}

impl From<BarError> for MessageError {
    fn from(e: BarError) -> Self {
        MessageError::Rejected(e.to_string())
    }
}

impl From<StorageError> for MessageError {
    fn from(e: StorageError) -> Self {
        MessageError::Rejected(e.to_string())
    }
}
