//! Error types for Subplane operations.
//!
//! [`SubplaneError`] covers integration mistakes: an unregistered command, a
//! context of the wrong shape, a handle that does not belong to the surface.
//! Defects in the document itself never surface here; they are collected as
//! [`ImportWarning`](crate::import::ImportWarning)s or recorded as the walk
//! error of an [`ImportReport`](crate::import::ImportReport).

use thiserror::Error;

use subplane_core::{ModelError, identifier::Id};

use crate::{canvas::NodeId, config::ConfigError};

/// The main error type for Subplane operations.
#[derive(Debug, Error)]
pub enum SubplaneError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("No handler registered for command `{0}`")]
    UnknownCommand(String),

    #[error("Command `{command}` received a context of the wrong kind")]
    ContextMismatch { command: String },

    #[error("Element `{0}` is not on the canvas")]
    UnknownElement(Id),

    #[error("Node {0:?} does not belong to this canvas")]
    UnknownNode(NodeId),

    #[error("No diagram draws `{0}`")]
    MissingDiagram(Id),

    #[error("Document contains no diagram")]
    NoDiagram,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
