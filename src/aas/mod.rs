//! Asset Administration Shell object model.
//!
//! A deliberately small slice of AAS v3.0: one shell with its asset
//! information, submodels of properties, and concept descriptions, plus the
//! JSON environment format used to persist and export them. Submodel
//! elements of other kinds, and members the model does not interpret,
//! survive a load/save round trip untouched.

pub mod json;
pub mod model;
pub mod view;
pub mod workspace;

pub use model::{
    AssetAdministrationShell, AssetInformation, AssetKind, ConceptDescription, Extra, Key, KeyType,
    LangString, ModellingKind, OpaqueElement, Property, PropertyValue, Reference, ReferenceKind, Submodel,
    SubmodelElement, ValueType,
};
pub use workspace::{AasWorkspace, FileReport};

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while editing or persisting a shell.
///
/// The `Display` text is shown to chat users verbatim.
#[derive(Debug, Error)]
pub enum AasError {
    #[error("No AAS exists. Please create an AAS first.")]
    NoShell,

    #[error("Submodel '{0}' not found")]
    SubmodelNotFound(String),

    #[error("Property '{property}' not found in submodel '{submodel}'")]
    PropertyNotFound { submodel: String, property: String },

    #[error("Element '{0}' is not a Property")]
    NotAProperty(String),

    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },

    #[error("Invalid value type: {0} (expected string, int, float or boolean)")]
    InvalidValueType(String),

    #[error("Invalid {value_type} value {value}: {reason}")]
    InvalidValue { value_type: String, value: String, reason: String },

    #[error("Invalid idShort '{0}': must start with a letter and contain only letters, digits, '_' or '-' (max 128, not ending in '-')")]
    InvalidIdShort(String),

    #[error("Invalid identifier '{0}': must be 1-2000 characters without control characters")]
    InvalidIdentifier(String),

    #[error("Invalid file name '{0}': use a plain name like motor.json")]
    InvalidFileName(String),

    #[error("File '{0}' not found")]
    FileNotFound(PathBuf),

    #[error("No AAS found in file '{0}'")]
    NoShellInFile(PathBuf),

    #[error("Malformed AAS JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
