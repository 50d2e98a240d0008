//! Error types for building and maintaining a [`Definitions`](crate::definitions::Definitions) document.

use thiserror::Error;

use crate::{di::DiId, identifier::Id};

/// Errors raised while constructing or mutating the document model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Element `{0}` is already defined")]
    DuplicateId(Id),

    #[error("Unknown element `{0}`")]
    UnknownElement(Id),

    #[error("Element `{0}` cannot contain flow elements")]
    NotAContainer(Id),

    #[error("Element `{0}` cannot be placed inside a container")]
    NotAFlowElement(Id),
}

/// Reasons a DI element could not be bound to its semantic element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("DI element references no semantic element")]
    Unreferenced,

    #[error("Element `{element}` is already bound to another DI element")]
    AlreadyBound { element: Id, existing: DiId },
}
