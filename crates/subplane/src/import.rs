//! Materializing diagram-interchange content on the canvas.
//!
//! - [`TreeWalker`] walks the semantic tree and reports drawable elements to
//!   a [`Visitor`].
//! - [`ElementImporter`] creates the node for one element; [`SurfaceImporter`]
//!   is the default implementation.
//! - [`TreeImport`] ties both together with an identity cache so that a
//!   repeated import reuses the nodes of the first one.

mod adapter;
mod importer;
mod report;
mod walker;

pub use adapter::TreeImport;
pub use importer::{ElementImporter, ImportError, SurfaceImporter};
pub use report::{ImportReport, ImportWarning};
pub use walker::{TreeWalker, Visitor, WalkError};
