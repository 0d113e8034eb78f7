use std::fmt;

use serde::Serialize;

// === ErrorKind ===

/// Coarse classification used to decide how a failure is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bad or missing input. Shown inline, never retried.
    Validation,
    /// The bookmark already exists. Shown inline.
    Conflict,
    /// Transport failure talking to the store.
    Remote,
    /// No signed-in identity.
    Auth,
}

// === RemoteError ===

/// Errors raised by the persistence and change-notification collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// A read against the store failed.
    Query(String),
    /// An insert or delete against the store failed.
    Write(String),
    /// Opening or closing a change subscription failed.
    Subscription(String),
    /// The filter referenced a column the store does not expose.
    InvalidFilter(String),
    /// The store could not be reached at all.
    Unavailable(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Query(msg) => write!(f, "Remote query failed: {}", msg),
            RemoteError::Write(msg) => write!(f, "Remote write failed: {}", msg),
            RemoteError::Subscription(msg) => write!(f, "Remote subscription failed: {}", msg),
            RemoteError::InvalidFilter(column) => {
                write!(f, "Invalid filter column: {}", column)
            }
            RemoteError::Unavailable(msg) => write!(f, "Remote store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

// === BookmarkError ===

/// Outcomes of a failed add or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    /// Title or URL was empty after trimming.
    MissingField,
    /// The normalised URL did not pass validation.
    MalformedUrl(String),
    /// A bookmark with the same canonical URL already exists.
    Duplicate(String),
    /// The store rejected or failed the write.
    Remote(RemoteError),
    /// No identity is signed in.
    NotAuthenticated,
}

impl BookmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookmarkError::MissingField | BookmarkError::MalformedUrl(_) => ErrorKind::Validation,
            BookmarkError::Duplicate(_) => ErrorKind::Conflict,
            BookmarkError::Remote(_) => ErrorKind::Remote,
            BookmarkError::NotAuthenticated => ErrorKind::Auth,
        }
    }

    /// The inline message shown next to the add form.
    pub fn user_message(&self) -> &'static str {
        match self {
            BookmarkError::MissingField => "Please fill all fields",
            BookmarkError::MalformedUrl(_) => "Please enter a valid URL (example: google.com)",
            BookmarkError::Duplicate(_) => "This bookmark already exists",
            BookmarkError::Remote(_) => "Failed to add bookmark. Please try again.",
            BookmarkError::NotAuthenticated => "Please sign in first",
        }
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::MissingField => write!(f, "Missing field: title and url are required"),
            BookmarkError::MalformedUrl(url) => write!(f, "Malformed bookmark URL: {}", url),
            BookmarkError::Duplicate(url) => write!(f, "Duplicate bookmark URL: {}", url),
            BookmarkError::Remote(err) => write!(f, "Bookmark remote error: {}", err),
            BookmarkError::NotAuthenticated => write!(f, "Not authenticated"),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookmarkError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteError> for BookmarkError {
    fn from(err: RemoteError) -> Self {
        BookmarkError::Remote(err)
    }
}

// === AuthError ===

/// Errors related to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider failed to answer.
    Provider(String),
    /// Sign-in was requested with a provider this backend does not offer.
    UnsupportedProvider(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Provider(msg) => write!(f, "Auth provider error: {}", msg),
            AuthError::UnsupportedProvider(name) => {
                write!(f, "Unsupported sign-in provider: {}", name)
            }
        }
    }
}

impl std::error::Error for AuthError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
