use std::path::{Path, PathBuf};

use crate::template::{Template, UpgradePath};

/// Pointer to the application folder to be transformed.
#[derive(Debug, Clone)]
pub struct Application {
    folder: PathBuf,
}

impl Application {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The application name, taken from the folder name.
    pub fn name(&self) -> String {
        self.folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "application".to_string())
    }
}

/// Caller-supplied knobs for one transformation run.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    output_folder: Option<PathBuf>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages the working directory under this folder instead of next to the
    /// application. The folder must exist.
    pub fn output_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.output_folder = Some(folder.into());
        self
    }

    pub fn get_output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }
}

/// What to run: a single template, or a whole upgrade path.
#[derive(Debug)]
pub enum Recipe {
    Template(Template),
    UpgradePath(UpgradePath),
}

impl Recipe {
    pub fn description(&self) -> String {
        match self {
            Recipe::Template(template) => format!("template '{}'", template.name()),
            Recipe::UpgradePath(path) => format!(
                "upgrade path {} -> {}",
                path.original_version(),
                path.upgrade_version()
            ),
        }
    }
}

/// A recipe bound to an application and a configuration.
#[derive(Debug)]
pub struct Transformation {
    application: Application,
    configuration: Configuration,
    recipe: Recipe,
    transformed_location: Option<PathBuf>,
}

impl Transformation {
    pub fn template(
        application: Application,
        configuration: Configuration,
        template: Template,
    ) -> Self {
        Self {
            application,
            configuration,
            recipe: Recipe::Template(template),
            transformed_location: None,
        }
    }

    pub fn upgrade_path(
        application: Application,
        configuration: Configuration,
        path: UpgradePath,
    ) -> Self {
        Self {
            application,
            configuration,
            recipe: Recipe::UpgradePath(path),
            transformed_location: None,
        }
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Where the staged working copy lives; set during staging.
    pub fn transformed_location(&self) -> Option<&Path> {
        self.transformed_location.as_deref()
    }

    pub fn set_transformed_location(&mut self, location: PathBuf) {
        self.transformed_location = Some(location);
    }
}
