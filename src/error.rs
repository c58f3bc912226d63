//! Error types for folio-fx.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while configuring or attaching page behaviors.
///
/// Runtime event handling never fails: behaviors are best effort and a missing
/// anchor target or a garbled counter value is logged, not returned.
#[derive(Error, Debug)]
pub enum Error {
    /// A behavior's required element is not in the document.
    #[error("{component}: no element matches `{selector}`")]
    MissingElement {
        component: &'static str,
        selector: String,
    },

    /// The typewriter has nothing to type.
    #[error("typewriter phrase list is empty")]
    EmptyPhraseList,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML configuration failed to parse.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Terminal host I/O failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn missing(component: &'static str, selector: impl Into<String>) -> Self {
        Self::MissingElement {
            component,
            selector: selector.into(),
        }
    }
}

/// Result type for folio-fx operations.
pub type Result<T> = std::result::Result<T, Error>;
