//! Outcome of a materialization pass.

use std::fmt;

use subplane_core::{di::DiId, identifier::Id};

use super::WalkError;

/// A non-fatal per-element import failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportWarning {
    message: String,
    element: Option<Id>,
    di: Option<DiId>,
}

impl ImportWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            di: None,
        }
    }

    /// Records the semantic element the warning is about.
    pub fn with_element(mut self, element: Id) -> Self {
        self.element = Some(element);
        self
    }

    /// Records the DI element the warning is about.
    pub fn with_di(mut self, di: DiId) -> Self {
        self.di = Some(di);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn element(&self) -> Option<Id> {
        self.element
    }

    pub fn di(&self) -> Option<DiId> {
        self.di
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Warnings and the walk-level error collected while importing one
/// sub-process.
#[derive(Debug, Clone)]
pub struct ImportReport {
    sub_process: Id,
    error: Option<WalkError>,
    warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub fn new(sub_process: Id, error: Option<WalkError>, warnings: Vec<ImportWarning>) -> Self {
        Self {
            sub_process,
            error,
            warnings,
        }
    }

    /// Returns the process or sub-process whose content was imported.
    pub fn sub_process(&self) -> Id {
        self.sub_process
    }

    /// Returns the structural failure that cut the walk short, if any.
    pub fn error(&self) -> Option<&WalkError> {
        self.error.as_ref()
    }

    pub fn warnings(&self) -> &[ImportWarning] {
        &self.warnings
    }

    /// Returns `true` if the pass finished without error or warning.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.warnings.is_empty()
    }
}
