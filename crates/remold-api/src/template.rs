use semver::Version;

use crate::utility::Utility;

/// An ordered recipe of utilities encoding one transformation.
#[derive(Debug)]
pub struct Template {
    name: String,
    utilities: Vec<Utility>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            utilities: Vec::new(),
        }
    }

    pub fn add(mut self, utility: Utility) -> Self {
        self.utilities.push(utility);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn utilities(&self) -> &[Utility] {
        &self.utilities
    }
}

/// One template taking the application from one version to the next.
#[derive(Debug)]
pub struct UpgradeStep {
    current_version: Version,
    next_version: Version,
    template: Template,
}

impl UpgradeStep {
    pub fn new(current_version: Version, next_version: Version, template: Template) -> Self {
        Self {
            current_version,
            next_version,
            template,
        }
    }

    pub fn current_version(&self) -> &Version {
        &self.current_version
    }

    pub fn next_version(&self) -> &Version {
        &self.next_version
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// A non-empty sequence of upgrade steps in ascending version order.
///
/// Steps are walked exactly once each, front to back; there is no cursor to
/// rewind.
#[derive(Debug)]
pub struct UpgradePath {
    steps: Vec<UpgradeStep>,
}

impl UpgradePath {
    pub fn new(first: UpgradeStep) -> Self {
        Self { steps: vec![first] }
    }

    pub fn then(mut self, step: UpgradeStep) -> Self {
        self.steps.push(step);
        self
    }

    /// The version the application starts at.
    pub fn original_version(&self) -> &Version {
        self.steps[0].current_version()
    }

    /// The version the application ends up at.
    pub fn upgrade_version(&self) -> &Version {
        self.steps[self.steps.len() - 1].next_version()
    }

    pub fn steps(&self) -> &[UpgradeStep] {
        &self.steps
    }
}
