//! Utilities and the shapes the engine dispatches on.
//!
//! A [`Utility`] is one unit of work in a recipe: a core descriptor (name,
//! flags, dependencies, relative path) plus a [`Shape`] carrying the
//! executable payload. The engine pattern-matches on the shape; catalogues
//! implement the [`Execute`]/[`Apply`]/[`ConditionFactory`] seams, either on
//! their own types or directly with closures.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU32;

use crate::context::ContextView;
use crate::error::UtilityError;
use crate::instruction::ManualInstructionRecord;
use crate::result::{ExecutionResult, OperationOutcome, PerformResult, UtilityOutcome};
use crate::value::Value;

/// Body of a value-computing utility.
pub trait Execute: Send + Sync {
    fn execute(
        &self,
        working_dir: &Path,
        context: &dyn ContextView,
    ) -> Result<UtilityOutcome, UtilityError>;
}

impl<F> Execute for F
where
    F: Fn(&Path, &dyn ContextView) -> Result<UtilityOutcome, UtilityError> + Send + Sync,
{
    fn execute(
        &self,
        working_dir: &Path,
        context: &dyn ContextView,
    ) -> Result<UtilityOutcome, UtilityError> {
        self(working_dir, context)
    }
}

/// Body of a file-mutating operation.
pub trait Apply: Send + Sync {
    fn apply(
        &self,
        working_dir: &Path,
        context: &dyn ContextView,
    ) -> Result<OperationOutcome, UtilityError>;
}

impl<F> Apply for F
where
    F: Fn(&Path, &dyn ContextView) -> Result<OperationOutcome, UtilityError> + Send + Sync,
{
    fn apply(
        &self,
        working_dir: &Path,
        context: &dyn ContextView,
    ) -> Result<OperationOutcome, UtilityError> {
        self(working_dir, context)
    }
}

/// Produces a fresh single-file condition utility per evaluated file.
pub trait ConditionFactory: Send + Sync {
    fn condition(&self, file: &Path) -> Utility;
}

impl<F> ConditionFactory for F
where
    F: Fn(&Path) -> Utility + Send + Sync,
{
    fn condition(&self, file: &Path) -> Utility {
        self(file)
    }
}

/// How per-file condition results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionMode {
    /// Logical and over all files, short-circuiting on the first false.
    All,
    /// Logical or over all files, short-circuiting on the first true.
    Any,
}

/// The capability a utility exposes to the engine.
///
/// An operation cannot also host children; every other practical combination
/// has its own variant (a loop is a parent for numbering purposes).
pub enum Shape {
    /// Computes a value.
    Utility(Box<dyn Execute>),
    /// Mutates files; advances the operation counter.
    Operation(Box<dyn Apply>),
    /// Hosts children, which run only if the gate produced a value.
    Parent {
        gate: Box<dyn Execute>,
        children: Vec<Utility>,
    },
    /// Repeats its body while the condition computes `true`.
    Loop {
        condition: Box<dyn Execute>,
        body: Box<Utility>,
        iteration: AtomicU32,
    },
    /// Evaluates a condition per file and folds the booleans.
    MultipleConditions {
        source: Box<dyn Execute>,
        condition: Box<dyn ConditionFactory>,
        mode: ConditionMode,
    },
    /// Retains the files for which the condition holds.
    FilterFiles {
        source: Box<dyn Execute>,
        condition: Box<dyn ConditionFactory>,
    },
    /// Registers a manual follow-up on the context.
    ManualInstruction(ManualInstructionRecord),
}

impl Shape {
    pub fn utility(body: impl Execute + 'static) -> Self {
        Shape::Utility(Box::new(body))
    }

    pub fn operation(body: impl Apply + 'static) -> Self {
        Shape::Operation(Box::new(body))
    }

    pub fn parent(gate: impl Execute + 'static, children: Vec<Utility>) -> Self {
        Shape::Parent {
            gate: Box::new(gate),
            children,
        }
    }

    pub fn utility_loop(condition: impl Execute + 'static, body: Utility) -> Self {
        Shape::Loop {
            condition: Box::new(condition),
            body: Box::new(body),
            iteration: AtomicU32::new(0),
        }
    }

    pub fn multiple_conditions(
        source: impl Execute + 'static,
        condition: impl ConditionFactory + 'static,
        mode: ConditionMode,
    ) -> Self {
        Shape::MultipleConditions {
            source: Box::new(source),
            condition: Box::new(condition),
            mode,
        }
    }

    pub fn filter_files(
        source: impl Execute + 'static,
        condition: impl ConditionFactory + 'static,
    ) -> Self {
        Shape::FilterFiles {
            source: Box::new(source),
            condition: Box::new(condition),
        }
    }

    pub fn manual_instruction(record: ManualInstructionRecord) -> Self {
        Shape::ManualInstruction(record)
    }

    fn run(
        &self,
        working_dir: &Path,
        context: &dyn ContextView,
    ) -> Result<ExecutionResult, UtilityError> {
        match self {
            Shape::Utility(body) => body.execute(working_dir, context).map(ExecutionResult::Utility),
            Shape::Operation(body) => body.apply(working_dir, context).map(ExecutionResult::Operation),
            Shape::Parent { gate, .. } => {
                gate.execute(working_dir, context).map(ExecutionResult::Utility)
            }
            Shape::Loop { condition, .. } => {
                condition.execute(working_dir, context).map(ExecutionResult::Utility)
            }
            Shape::MultipleConditions { source, .. } | Shape::FilterFiles { source, .. } => {
                source.execute(working_dir, context).map(ExecutionResult::Utility)
            }
            Shape::ManualInstruction(record) => Ok(ExecutionResult::Utility(
                UtilityOutcome::Value(Value::Instruction(record.clone())),
            )),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Utility(_) => f.write_str("Utility"),
            Shape::Operation(_) => f.write_str("Operation"),
            Shape::Parent { children, .. } => {
                write!(f, "Parent({} children)", children.len())
            }
            Shape::Loop { .. } => f.write_str("Loop"),
            Shape::MultipleConditions { mode, .. } => write!(f, "MultipleConditions({mode:?})"),
            Shape::FilterFiles { .. } => f.write_str("FilterFiles"),
            Shape::ManualInstruction(record) => {
                write!(f, "ManualInstruction({})", record.description())
            }
        }
    }
}

/// One unit of work in a recipe.
#[derive(Debug)]
pub struct Utility {
    name: String,
    description: String,
    context_attribute_name: Option<String>,
    save_result: bool,
    abort_on_failure: bool,
    abortion_message: Option<String>,
    depends_on: Vec<String>,
    execute_if: Option<String>,
    relative_path: PathBuf,
    shape: Shape,
}

impl Utility {
    pub fn new(name: impl Into<String>, description: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            context_attribute_name: None,
            save_result: true,
            abort_on_failure: false,
            abortion_message: None,
            depends_on: Vec::new(),
            execute_if: None,
            relative_path: PathBuf::new(),
            shape,
        }
    }

    /// Stores the execution value under this attribute instead of the
    /// utility name.
    pub fn context_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.context_attribute_name = Some(name.into());
        self
    }

    pub fn save_result(mut self, save: bool) -> Self {
        self.save_result = save;
        self
    }

    pub fn abort_on_failure(mut self, abort: bool) -> Self {
        self.abort_on_failure = abort;
        self
    }

    pub fn abortion_message(mut self, message: impl Into<String>) -> Self {
        self.abortion_message = Some(message.into());
        self
    }

    /// Names of utilities whose results must not be failures for this one
    /// to run.
    pub fn depends_on(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = names.into_iter().map(Into::into).collect();
        self
    }

    /// Runs only if a `true` boolean is stored under this attribute.
    pub fn execute_if(mut self, attribute: impl Into<String>) -> Self {
        self.execute_if = Some(attribute.into());
        self
    }

    pub fn relative_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.relative_path = path.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The attribute the execution value is stored under: the configured
    /// one, or the utility name.
    pub fn context_key(&self) -> &str {
        self.context_attribute_name.as_deref().unwrap_or(&self.name)
    }

    pub fn saves_result(&self) -> bool {
        self.save_result
    }

    pub fn aborts_on_failure(&self) -> bool {
        self.abort_on_failure
    }

    pub fn get_abortion_message(&self) -> Option<&str> {
        self.abortion_message.as_deref()
    }

    pub fn get_dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn get_execute_if(&self) -> Option<&str> {
        self.execute_if.as_deref()
    }

    pub fn get_relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// The file this utility works against, resolved under `working_dir`.
    pub fn absolute_file(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(&self.relative_path)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_operation(&self) -> bool {
        matches!(self.shape, Shape::Operation(_))
    }

    /// Operations and parents (loops included) advance the sibling
    /// execution-order counter; plain utilities do not.
    pub fn advances_execution_order(&self) -> bool {
        matches!(
            self.shape,
            Shape::Operation(_) | Shape::Parent { .. } | Shape::Loop { .. }
        )
    }

    /// Runs this utility: dependencies first, then the execute-if condition,
    /// then the shape body. Body failures are encoded in the result rather
    /// than raised.
    pub fn perform(&self, working_dir: &Path, context: &dyn ContextView) -> PerformResult {
        if let Some(details) = self.failed_dependency(context) {
            return PerformResult::skipped_dependency(details);
        }
        if let Some(attribute) = self.get_execute_if() {
            let holds = matches!(context.value(attribute), Some(Value::Bool(true)));
            if !holds {
                return PerformResult::skipped_condition(format!(
                    "'{}' skipped, condition '{attribute}' does not hold",
                    self.name
                ));
            }
        }
        match self.shape.run(working_dir, context) {
            Ok(result) => PerformResult::Executed(result),
            Err(error) => PerformResult::error(error),
        }
    }

    fn failed_dependency(&self, context: &dyn ContextView) -> Option<String> {
        for dependency in &self.depends_on {
            match context.result(dependency) {
                None => {
                    return Some(format!(
                        "'{}' skipped, dependency '{dependency}' has not produced any result",
                        self.name
                    ));
                }
                Some(result) if result.is_dependency_failure() => {
                    return Some(format!(
                        "'{}' skipped, dependency '{dependency}' failed",
                        self.name
                    ));
                }
                Some(_) => {}
            }
        }
        None
    }
}

impl fmt::Display for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}
