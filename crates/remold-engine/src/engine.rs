//! The engine proper: template and upgrade drivers plus the per-utility
//! dispatcher.
//!
//! Dispatch stamps every utility with a dotted execution order ("2", "2.1",
//! "2.1.3"), interprets its perform result, recurses into children and loop
//! bodies, and threads values through the transformation context. Failures
//! of utilities flagged `abort_on_failure` unwind the template; everything
//! else is recorded and execution moves on.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use remold_api::{
    ConditionFactory, ConditionMode, ExecutionResult, OperationOutcome, PerformResult, Recipe,
    Shape, Template, Transformation, UpgradePath, Utility, UtilityError, UtilityOutcome, Value,
};
use tracing::{debug, error, info, warn};

use crate::context::TransformationContext;
use crate::error::{EngineError, TransformationError};
use crate::listener::{notify_all, TransformationListener};
use crate::result::TransformationResult;
use crate::staging;

const STEP_BANNER: &str =
    "====================================================================================";
const LOOP_BANNER: &str = "...........................";

/// A template abort together with the context accumulated so far.
struct AbortedTemplate {
    error: TransformationError,
    context: Option<TransformationContext>,
}

/// Applies transformations. Listeners are registered at construction and the
/// set is immutable afterwards; a single engine may be shared across threads
/// as long as concurrent transformations use disjoint output folders.
#[derive(Default)]
pub struct TransformationEngine {
    listeners: Vec<Box<dyn TransformationListener>>,
}

impl TransformationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: impl TransformationListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Stages a working copy of the application and drives the recipe
    /// against it.
    ///
    /// On success all registered listeners receive a post-transformation
    /// notification; on abort they receive the abort notification and the
    /// staged folder is left on disk for inspection.
    pub fn perform(
        &self,
        mut transformation: Transformation,
    ) -> Result<TransformationResult, EngineError> {
        debug!(
            "requested transformation of {} with {}",
            transformation.application().folder().display(),
            transformation.recipe().description()
        );

        let working_dir = staging::prepare_output_folder(&mut transformation)?;
        let mut contexts = Vec::new();

        match self.run_recipe(&transformation, &working_dir, &mut contexts) {
            Ok(()) => {
                let result = TransformationResult::new(&transformation, working_dir, &contexts);
                notify_all(&self.listeners, &transformation, &contexts, false);
                Ok(result)
            }
            Err(aborted) => {
                if let Some(context) = aborted.context {
                    contexts.push(context);
                }
                notify_all(&self.listeners, &transformation, &contexts, true);
                Err(EngineError::Aborted(aborted.error))
            }
        }
    }

    fn run_recipe(
        &self,
        transformation: &Transformation,
        working_dir: &Path,
        contexts: &mut Vec<TransformationContext>,
    ) -> Result<(), AbortedTemplate> {
        match transformation.recipe() {
            Recipe::Template(template) => {
                let context = self.perform_template(template, working_dir, None)?;
                contexts.push(context);
            }
            Recipe::UpgradePath(path) => {
                self.perform_upgrade_path(path, working_dir, contexts)?;
            }
        }
        Ok(())
    }

    fn perform_upgrade_path(
        &self,
        path: &UpgradePath,
        working_dir: &Path,
        contexts: &mut Vec<TransformationContext>,
    ) -> Result<(), AbortedTemplate> {
        info!("{STEP_BANNER}");
        info!(
            "upgrade path from version {} to version {}",
            path.original_version(),
            path.upgrade_version()
        );

        for step in path.steps() {
            info!("{STEP_BANNER}");
            info!("upgrade step");
            info!("  * from version: {}", step.current_version());
            info!("  * to version: {}", step.next_version());

            let context = self.perform_template(step.template(), working_dir, contexts.last())?;
            contexts.push(context);
        }
        Ok(())
    }

    fn perform_template(
        &self,
        template: &Template,
        working_dir: &Path,
        previous: Option<&TransformationContext>,
    ) -> Result<TransformationContext, AbortedTemplate> {
        info!("{STEP_BANNER}");
        info!("beginning transformation");

        let mut context = TransformationContext::inheriting(previous);
        context.set_template(template.name());

        let mut operations_execution_order = 1;
        for utility in template.utilities() {
            let order = operations_execution_order.to_string();
            if let Err(error) = self.perform_utility(utility, working_dir, &mut context, &order) {
                return Err(AbortedTemplate {
                    error,
                    context: Some(context),
                });
            }
            if utility.advances_execution_order() {
                operations_execution_order += 1;
            }
        }

        info!("transformation has been completed");
        Ok(context)
    }

    /// Dispatches one utility. The raw perform result is stored under the
    /// utility name after all shape post-processing, on the abort path too.
    fn perform_utility(
        &self,
        utility: &Utility,
        working_dir: &Path,
        context: &mut TransformationContext,
        order: &str,
    ) -> Result<(), TransformationError> {
        let mut result = utility.perform(working_dir, &*context);
        let flow = self.process_perform_result(utility, &mut result, working_dir, context, order);
        if utility.saves_result() {
            context.put_result(utility.name(), result);
        }
        flow
    }

    fn process_perform_result(
        &self,
        utility: &Utility,
        result: &mut PerformResult,
        working_dir: &Path,
        context: &mut TransformationContext,
        order: &str,
    ) -> Result<(), TransformationError> {
        match result {
            PerformResult::SkippedCondition { details }
            | PerformResult::SkippedDependency { details } => {
                if utility.is_operation() {
                    info!("\t{order}\t - {details}");
                } else {
                    debug!("\t{order}\t - {details}");
                }
                Ok(())
            }
            PerformResult::Error { error, .. } => {
                let error = error.clone();
                self.process_error(utility, &error, order, context)
            }
            PerformResult::Executed(ExecutionResult::Operation(outcome)) => {
                let outcome = outcome.clone();
                self.process_operation_outcome(utility, &outcome, order, context)
            }
            PerformResult::Executed(ExecutionResult::Utility(outcome)) => {
                let outcome = outcome.clone();
                self.process_executed_utility(utility, outcome, result, working_dir, context, order)
            }
        }
    }

    /// Post-processing for value-computing utilities: condition folds and
    /// filters first (they replace the result), then result processing, then
    /// loop, parent and manual-instruction handling driven by the original
    /// execution value.
    fn process_executed_utility(
        &self,
        utility: &Utility,
        outcome: UtilityOutcome,
        result: &mut PerformResult,
        working_dir: &Path,
        context: &mut TransformationContext,
        order: &str,
    ) -> Result<(), TransformationError> {
        if outcome.is_error() {
            return self.process_utility_outcome(utility, result, context);
        }
        let value = outcome.value().cloned();

        match utility.shape() {
            Shape::MultipleConditions {
                condition, mode, ..
            } => {
                let files = self.source_files(utility, value.as_ref(), context)?;
                *result = self.perform_multiple_conditions(
                    utility,
                    condition.as_ref(),
                    *mode,
                    &files,
                    working_dir,
                    context,
                )?;
            }
            Shape::FilterFiles { condition, .. } => {
                let files = self.source_files(utility, value.as_ref(), context)?;
                *result = self.perform_filter_files(
                    utility,
                    condition.as_ref(),
                    &files,
                    working_dir,
                    context,
                )?;
            }
            _ => {}
        }

        self.process_utility_outcome(utility, result, context)?;

        match utility.shape() {
            Shape::Loop {
                body, iteration, ..
            } => {
                if matches!(value, Some(Value::Bool(true))) {
                    let next_iteration = iteration.fetch_add(1, Ordering::Relaxed) + 1;
                    let new_order = format!("{order}.{next_iteration}");

                    info!("{LOOP_BANNER}");
                    info!(
                        "\t{new_order}\t - iteration {next_iteration} of loop {}",
                        utility.name()
                    );

                    self.perform_utility(body, working_dir, context, &format!("{new_order}.1"))?;
                    // re-evaluates the loop condition at the original order
                    self.perform_utility(utility, working_dir, context, order)?;
                }
            }
            Shape::Parent { children, .. } => {
                if matches!(outcome, UtilityOutcome::Value(_)) {
                    info!(
                        "\t{order}\t - executing utilities parent {}",
                        utility.name()
                    );
                    let mut child_order = 1;
                    for child in children {
                        self.perform_utility(
                            child,
                            working_dir,
                            context,
                            &format!("{order}.{child_order}"),
                        )?;
                        if child.advances_execution_order() {
                            child_order += 1;
                        }
                    }
                }
            }
            Shape::ManualInstruction(_) => {
                if let Some(Value::Instruction(record)) = value {
                    context.register_instruction(record);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Evaluates a fresh condition per file and folds the booleans.
    fn perform_multiple_conditions(
        &self,
        utility: &Utility,
        factory: &dyn ConditionFactory,
        mode: ConditionMode,
        files: &[PathBuf],
        working_dir: &Path,
        context: &mut TransformationContext,
    ) -> Result<PerformResult, TransformationError> {
        let all_mode = mode == ConditionMode::All;
        let mut verdict = false;

        for file in files {
            let condition = factory.condition(file);
            let inner = condition.perform(working_dir, &*context);
            match condition_boolean(&inner) {
                Ok(holds) => {
                    self.process_utility_outcome(&condition, &inner, context)?;
                    verdict = holds;
                    if (!holds && all_mode) || (holds && !all_mode) {
                        break;
                    }
                }
                Err(inner_error) => {
                    let outer = UtilityError::new(format!(
                        "multiple utility condition '{}' execution failed when evaluating condition '{}' against file {}",
                        utility.name(),
                        condition.name(),
                        file.display()
                    ))
                    .caused_by(inner_error);
                    return Ok(PerformResult::Executed(ExecutionResult::Utility(
                        UtilityOutcome::Error(outer),
                    )));
                }
            }
        }

        Ok(PerformResult::Executed(ExecutionResult::Utility(
            UtilityOutcome::Value(Value::Bool(verdict)),
        )))
    }

    /// Retains the files for which the condition holds.
    fn perform_filter_files(
        &self,
        utility: &Utility,
        factory: &dyn ConditionFactory,
        files: &[PathBuf],
        working_dir: &Path,
        context: &mut TransformationContext,
    ) -> Result<PerformResult, TransformationError> {
        let mut retained = Vec::new();

        for file in files {
            let condition = factory.condition(file);
            let inner = condition.perform(working_dir, &*context);
            match condition_boolean(&inner) {
                Ok(holds) => {
                    self.process_utility_outcome(&condition, &inner, context)?;
                    if holds {
                        retained.push(file.clone());
                    }
                }
                Err(inner_error) => {
                    let outer = UtilityError::new(format!(
                        "file filter '{}' failed when evaluating condition '{}' against file {}",
                        utility.name(),
                        condition.name(),
                        file.display()
                    ))
                    .caused_by(inner_error);
                    return Ok(PerformResult::Executed(ExecutionResult::Utility(
                        UtilityOutcome::Error(outer),
                    )));
                }
            }
        }

        Ok(PerformResult::Executed(ExecutionResult::Utility(
            UtilityOutcome::Value(Value::FileList(retained)),
        )))
    }

    /// The file collection a multiple-conditions or filter utility computed.
    /// Anything else is an internal dispatch error and aborts the template.
    fn source_files(
        &self,
        utility: &Utility,
        value: Option<&Value>,
        context: &mut TransformationContext,
    ) -> Result<Vec<PathBuf>, TransformationError> {
        match value.and_then(Value::files) {
            Some(files) => Ok(files),
            None => {
                let error = UtilityError::new(format!(
                    "'{}' did not produce a collection of files to evaluate",
                    utility.name()
                ));
                error!("internal transformation error: {error}");
                let message = format!("{} failed when performing transformation", utility.name());
                context.record_abort(error.clone(), &message, utility.name());
                Err(TransformationError::new(message, error))
            }
        }
    }

    fn process_operation_outcome(
        &self,
        utility: &Utility,
        outcome: &OperationOutcome,
        order: &str,
        context: &mut TransformationContext,
    ) -> Result<(), TransformationError> {
        match outcome {
            OperationOutcome::Success { details } => {
                info!("\t{order}\t - {details}");
                Ok(())
            }
            OperationOutcome::NoOp { details } => {
                debug!("\t{order}\t - {details}");
                Ok(())
            }
            OperationOutcome::Warning { details, warnings } => {
                self.log_warnings(utility, details, warnings, order);
                Ok(())
            }
            OperationOutcome::Error { error, .. } => {
                self.process_error(utility, error, order, context)
            }
        }
    }

    /// Saves the execution value (when `save_result` holds) and logs the
    /// outcome; error-tagged outcomes go through error handling.
    fn process_utility_outcome(
        &self,
        utility: &Utility,
        result: &PerformResult,
        context: &mut TransformationContext,
    ) -> Result<(), TransformationError> {
        let Some(outcome) = result.utility_outcome() else {
            return Ok(());
        };

        if utility.saves_result() {
            if let Some(value) = outcome.value() {
                context.put_value(utility.context_key(), value.clone());
            }
        }

        match outcome {
            UtilityOutcome::Null => {
                if utility.saves_result() {
                    warn!(
                        "\t-\t - {utility}; {} has returned no value",
                        utility.name()
                    );
                }
                Ok(())
            }
            UtilityOutcome::Value(value) => {
                debug!(
                    "\t-\t - [{}][result: {}][utility: {}]",
                    abbreviate(&utility.to_string(), 240),
                    abbreviate(&value.to_string(), 120),
                    utility.name()
                );
                Ok(())
            }
            UtilityOutcome::Warning {
                details, warnings, ..
            } => {
                self.log_warnings(utility, details, warnings, "-");
                Ok(())
            }
            UtilityOutcome::Error(error) => {
                let error = error.clone();
                self.process_error(utility, &error, "-", context)
            }
        }
    }

    /// Aborting utilities unwind the template; anything else is logged and
    /// left for the context record.
    fn process_error(
        &self,
        utility: &Utility,
        error: &UtilityError,
        order: &str,
        context: &mut TransformationContext,
    ) -> Result<(), TransformationError> {
        if utility.aborts_on_failure() {
            error!(
                "*** transformation will be aborted due to failure in {} ***",
                utility.name()
            );
            if let Some(message) = utility.get_abortion_message() {
                error!("*** {message} ***");
            }
            error!("*** description: {}", utility.description());
            error!("*** cause: {error}");

            let message = utility
                .get_abortion_message()
                .map(str::to_owned)
                .unwrap_or_else(|| {
                    format!("{} failed when performing transformation", utility.name())
                });
            context.record_abort(error.clone(), &message, utility.name());
            Err(TransformationError::new(message, error.clone()))
        } else {
            error!(
                "\t{order}\t - '{}' has failed, see debug logs for further details; utility name: {}",
                utility.description(),
                utility.name()
            );
            debug!("{} has failed: {error}", utility.name());
            Ok(())
        }
    }

    fn log_warnings(&self, utility: &Utility, details: &str, warnings: &[UtilityError], order: &str) {
        warn!(
            "\t{order}\t - '{}' has been executed, but it has warnings, see debug logs for further details; utility name: {}",
            utility.description(),
            utility.name()
        );
        if warnings.is_empty() {
            debug!("  * warning message: {details}");
        } else {
            debug!("  * execution details: {details}");
            debug!("  * warnings:");
            for warning in warnings {
                debug!("    - {warning}");
            }
        }
    }
}

/// The boolean a condition computed, or the failure that prevented it. Inner
/// results that never executed, errored, or hold anything but a boolean are
/// failures of the fold (not of the template).
fn condition_boolean(inner: &PerformResult) -> Result<bool, UtilityError> {
    match inner.utility_outcome() {
        Some(UtilityOutcome::Value(value))
        | Some(UtilityOutcome::Warning {
            value: Some(value), ..
        }) => value
            .as_bool()
            .ok_or_else(|| UtilityError::new("condition did not produce a boolean result")),
        _ => Err(inner
            .get_error()
            .cloned()
            .unwrap_or_else(|| UtilityError::new("condition did not produce an execution result"))),
    }
}

fn abbreviate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
