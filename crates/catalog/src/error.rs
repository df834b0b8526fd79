//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while loading or validating a catalog snapshot
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Snapshot file could not be found or opened
    #[error("Failed to open catalog snapshot: {path}")]
    FileNotFound { path: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Snapshot is not valid JSON or does not match the expected layout
    #[error("Parse error in {file}: {source}")]
    ParseError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A field had an invalid value (e.g. an empty id)
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    /// Two records share the same id
    #[error("Duplicate {entity} id: {id}")]
    DuplicateId { entity: String, id: String },

    /// Referenced entity doesn't exist (e.g. a product in an unknown category)
    #[error("Missing reference: {entity} with id {id} (referenced by {referenced_by})")]
    MissingReference {
        entity: String,
        id: String,
        referenced_by: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
