use std::path::PathBuf;

use remold_api::UtilityError;
use thiserror::Error;

/// Terminal failure of a template, triggered by an aborting utility or an
/// internal dispatch error.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransformationError {
    message: String,
    #[source]
    source: UtilityError,
}

impl TransformationError {
    pub(crate) fn new(message: impl Into<String>, source: UtilityError) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure while preparing the working directory. Raised before any listener
/// is notified.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("invalid output folder ({0})")]
    InvalidOutputFolder(PathBuf),

    #[error("could not determine an output parent folder")]
    OutputParent(#[source] std::io::Error),

    #[error("transformed application folder ({0}) could not be created")]
    CreateFolder(PathBuf, #[source] std::io::Error),

    #[error("an error occurred when preparing the transformed application folder ({to}); check also if the original application folder ({from}) is valid")]
    CopyTree {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything `perform` can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Aborted(#[from] TransformationError),
}
