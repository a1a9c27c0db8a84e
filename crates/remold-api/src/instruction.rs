use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A follow-up the user must perform by hand after the automated run.
///
/// Records are appended to the transformation context in execution order and
/// aggregated into the final transformation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualInstructionRecord {
    description: String,
    resource: Option<PathBuf>,
}

impl ManualInstructionRecord {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            resource: None,
        }
    }

    /// Points at a document describing the follow-up in detail, relative to
    /// the transformed application folder.
    pub fn resource(mut self, resource: impl Into<PathBuf>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn get_resource(&self) -> Option<&Path> {
        self.resource.as_deref()
    }
}
