use crate::result::PerformResult;
use crate::value::Value;

/// Read surface a utility sees of the transformation context.
///
/// Utilities may read values and results other utilities saved; all writes
/// (values, results, instruction log, abort state) go through the engine.
pub trait ContextView {
    /// A value saved under the given context attribute name.
    fn value(&self, name: &str) -> Option<&Value>;

    /// The raw perform result saved under the given utility name.
    fn result(&self, name: &str) -> Option<&PerformResult>;
}
