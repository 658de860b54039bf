//! Unified error types for the product service.
//!
//! Every failure the core can produce is a variant of [`Error`]. The core never
//! retries or swallows these; callers at the boundary map them to a response
//! through [`Error::kind`].

use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// All errors produced by the product service.
#[derive(Debug, Error)]
pub enum Error {
    /// A supplied field failed validation.
    #[error("{message}")]
    Validation {
        /// Name of the offending field as exposed to clients
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// The identifier is not a well-formed product id.
    #[error("Invalid id '{id}'.")]
    InvalidId {
        /// The raw identifier as received
        id: String,
    },

    /// A product with this name already exists.
    #[error("You already have this product.")]
    DuplicateName {
        /// The normalized name that collided
        name: String,
    },

    /// The requested record does not exist.
    #[error("{message}")]
    NotFound {
        /// Human-readable reason
        message: String,
    },

    /// An update supplied a field whose value equals the stored one.
    #[error("The '{field}' is equal to the previous value.")]
    NoOpField {
        /// Name of the unchanged field
        field: String,
    },

    /// A paginated query produced an empty page.
    #[error("No payload.")]
    EmptyResult,

    /// The image upload collaborator failed.
    #[error("Image upload failed: {message}")]
    Upload {
        /// Description of the upload failure
        message: String,
    },

    /// Opaque failure from the backing store.
    #[error("Database error: {0}")]
    Storage(#[from] DbErr),

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration failure
        message: String,
    },

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a validation error for `field`.
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Builds the not-found error used for product lookups.
    pub fn product_not_found() -> Self {
        Self::NotFound {
            message: "Required product not found.".to_string(),
        }
    }

    /// Maps a store error raised by a product write.
    ///
    /// A unique-index violation means another writer claimed `name` between our
    /// check and our write; it surfaces as [`Error::DuplicateName`].
    pub fn from_product_write(err: DbErr, name: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::DuplicateName {
                name: name.to_string(),
            },
            _ => Self::Storage(err),
        }
    }

    /// The caller-visible category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidId { .. } => ErrorKind::Validation,
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NoOpField { .. } => ErrorKind::NoOpField,
            Self::EmptyResult => ErrorKind::EmptyResult,
            Self::Upload { .. } => ErrorKind::Upload,
            Self::Storage(_) | Self::Config { .. } | Self::Io(_) => ErrorKind::Storage,
        }
    }

    /// Field-level details attached to this error, if any.
    pub fn details(&self) -> Vec<FieldError> {
        match self {
            Self::Validation { field, message } => vec![FieldError {
                field: field.clone(),
                message: message.clone(),
            }],
            Self::InvalidId { id } => vec![FieldError {
                field: "id".to_string(),
                message: format!("'{id}' is not a valid identifier."),
            }],
            Self::NoOpField { field } => vec![FieldError {
                field: field.clone(),
                message: self.to_string(),
            }],
            _ => Vec::new(),
        }
    }
}

/// Flat error taxonomy exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed id or field
    Validation,
    /// Name already taken
    DuplicateName,
    /// Record missing
    NotFound,
    /// Update did not change a supplied field
    NoOpField,
    /// Pagination produced nothing
    EmptyResult,
    /// Image upload failed
    Upload,
    /// Store or environment failure
    Storage,
}

impl ErrorKind {
    /// HTTP status a transport layer should answer with.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation | Self::NoOpField => 400,
            Self::NotFound | Self::EmptyResult => 404,
            Self::DuplicateName => 409,
            Self::Upload => 502,
            Self::Storage => 500,
        }
    }
}

/// One field-level problem reported alongside an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
