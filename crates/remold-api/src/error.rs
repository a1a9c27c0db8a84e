use std::fmt;

/// Error reported by a utility body, or raised on its behalf by the engine.
///
/// These errors are recorded in the transformation context and inherited
/// across upgrade steps, so the type is `Clone`; nested causes are flattened
/// into text at construction.
#[derive(Debug, Clone)]
pub struct UtilityError {
    message: String,
    cause: Option<String>,
}

impl std::error::Error for UtilityError {}

impl UtilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl fmt::Display for UtilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {cause})")?;
        }
        Ok(())
    }
}

impl From<std::io::Error> for UtilityError {
    fn from(err: std::io::Error) -> Self {
        Self::new("I/O failure").caused_by(err)
    }
}
