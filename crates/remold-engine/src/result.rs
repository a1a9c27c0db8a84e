use std::path::{Path, PathBuf};

use remold_api::{ManualInstructionRecord, Transformation};
use serde::Serialize;

use crate::context::TransformationContext;

/// Outcome of a completed transformation.
#[derive(Debug, Clone, Serialize)]
pub struct TransformationResult {
    application_folder: PathBuf,
    transformed_location: PathBuf,
    recipe: String,
    manual_instructions: Vec<ManualInstructionRecord>,
    successful: bool,
}

impl TransformationResult {
    pub(crate) fn new(
        transformation: &Transformation,
        transformed_location: PathBuf,
        contexts: &[TransformationContext],
    ) -> Self {
        let manual_instructions = contexts
            .iter()
            .flat_map(|context| context.manual_instructions().iter().cloned())
            .collect();
        Self {
            application_folder: transformation.application().folder().to_path_buf(),
            transformed_location,
            recipe: transformation.recipe().description(),
            manual_instructions,
            successful: true,
        }
    }

    pub fn application_folder(&self) -> &Path {
        &self.application_folder
    }

    /// Where the transformed application lives.
    pub fn transformed_location(&self) -> &Path {
        &self.transformed_location
    }

    pub fn recipe(&self) -> &str {
        &self.recipe
    }

    /// Work the user still has to do by hand, from every context, in
    /// execution order.
    pub fn manual_instructions(&self) -> &[ManualInstructionRecord] {
        &self.manual_instructions
    }

    pub fn has_manual_instructions(&self) -> bool {
        !self.manual_instructions.is_empty()
    }

    pub fn successful(&self) -> bool {
        self.successful
    }
}
