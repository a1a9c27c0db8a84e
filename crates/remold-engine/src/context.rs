use std::collections::HashMap;

use remold_api::{ContextView, ManualInstructionRecord, PerformResult, UtilityError, Value};

/// Per-template key/value store, manual-instruction log, and abort state.
///
/// A context created for an upgrade step inherits the values and results of
/// its predecessor; writes land only in the new context, so earlier steps
/// stay untouched.
#[derive(Debug, Default)]
pub struct TransformationContext {
    values: HashMap<String, Value>,
    results: HashMap<String, PerformResult>,
    instructions: Vec<ManualInstructionRecord>,
    abort: Option<AbortDetails>,
    template: String,
}

/// Why a template was aborted, recorded on its context.
#[derive(Debug, Clone)]
pub struct AbortDetails {
    error: UtilityError,
    message: String,
    utility_name: String,
}

impl AbortDetails {
    pub fn error(&self) -> &UtilityError {
        &self.error
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn utility_name(&self) -> &str {
        &self.utility_name
    }
}

impl TransformationContext {
    pub(crate) fn inheriting(previous: Option<&TransformationContext>) -> Self {
        match previous {
            Some(previous) => Self {
                values: previous.values.clone(),
                results: previous.results.clone(),
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    pub(crate) fn set_template(&mut self, name: &str) {
        self.template = name.to_string();
    }

    /// The template this context was created for.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub(crate) fn put_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub(crate) fn put_result(&mut self, name: &str, result: PerformResult) {
        self.results.insert(name.to_string(), result);
    }

    pub(crate) fn register_instruction(&mut self, record: ManualInstructionRecord) {
        self.instructions.push(record);
    }

    pub(crate) fn record_abort(&mut self, error: UtilityError, message: &str, utility_name: &str) {
        self.abort = Some(AbortDetails {
            error,
            message: message.to_string(),
            utility_name: utility_name.to_string(),
        });
    }

    /// Manual follow-ups registered while this template ran, in execution
    /// order.
    pub fn manual_instructions(&self) -> &[ManualInstructionRecord] {
        &self.instructions
    }

    pub fn abort(&self) -> Option<&AbortDetails> {
        self.abort.as_ref()
    }

    pub fn aborted(&self) -> bool {
        self.abort.is_some()
    }
}

impl ContextView for TransformationContext {
    fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn result(&self, name: &str) -> Option<&PerformResult> {
        self.results.get(name)
    }
}
