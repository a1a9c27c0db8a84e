use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::instruction::ManualInstructionRecord;

/// A value produced by a utility execution.
///
/// Utility values are heterogeneous; the variants cover the kinds the engine
/// inspects. Anything else travels through `Opaque` untouched and can be
/// downcast by whoever saved it.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Text(String),
    /// A set of files, iterated in path order.
    FileSet(BTreeSet<PathBuf>),
    /// An ordered list of files, e.g. the outcome of a filter.
    FileList(Vec<PathBuf>),
    Instruction(ManualInstructionRecord),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn file_set(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Value::FileSet(files.into_iter().collect())
    }

    pub fn opaque(value: impl Any + Send + Sync) -> Self {
        Value::Opaque(Arc::new(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The files carried by this value, in iteration order, if it is a file
    /// collection.
    pub fn files(&self) -> Option<Vec<PathBuf>> {
        match self {
            Value::FileSet(files) => Some(files.iter().cloned().collect()),
            Value::FileList(files) => Some(files.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value}"),
            Value::FileSet(files) => {
                write!(f, "{{")?;
                for (i, file) in files.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", file.display())?;
                }
                write!(f, "}}")
            }
            Value::FileList(files) => {
                write!(f, "[")?;
                for (i, file) in files.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", file.display())?;
                }
                write!(f, "]")
            }
            Value::Instruction(record) => write!(f, "{}", record.description()),
            Value::Opaque(_) => write!(f, "<opaque>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Value::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Value::FileSet(files) => f.debug_tuple("FileSet").field(files).finish(),
            Value::FileList(files) => f.debug_tuple("FileList").field(files).finish(),
            Value::Instruction(record) => f.debug_tuple("Instruction").field(record).finish(),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}
