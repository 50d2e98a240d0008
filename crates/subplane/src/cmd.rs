//! The plane migration commands.
//!
//! [`ExpandSubProcessHandler`] moves the content of a sub-process from its
//! private diagram onto the process plane and draws it inside the
//! sub-process shape. [`CollapseSubProcessHandler`] is its mirror: it moves
//! the content into the private diagram, creating that diagram on first use,
//! and removes the drawn nodes.
//!
//! Both share a [`SubProcessContext`] whose identity cache makes undo and
//! redo reuse the nodes drawn the first time.

mod collapse;
mod context;
mod expand;

pub use collapse::{COLLAPSE_SUBPROCESS, CollapseSubProcessHandler};
pub use context::SubProcessContext;
pub use expand::{EXPAND_SUBPROCESS, ExpandSubProcessHandler};
