//! The remold transformation engine.
//!
//! [`TransformationEngine::perform`] drives a recipe tree against a staged
//! copy of an application folder: staging copies the application aside,
//! the dispatcher walks the utilities with dotted execution-order stamps,
//! a per-template context threads values between utilities and across
//! upgrade steps, and listeners are notified after the terminal outcome.
//! On abort the staged folder is left as-is for inspection.

mod context;
mod engine;
mod error;
mod listener;
mod result;
mod staging;

pub use context::{AbortDetails, TransformationContext};
pub use engine::TransformationEngine;
pub use error::{EngineError, StagingError, TransformationError};
pub use listener::TransformationListener;
pub use result::TransformationResult;
