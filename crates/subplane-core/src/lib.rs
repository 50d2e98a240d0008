//! Subplane Core Types
//!
//! This crate provides the in-memory BPMN document model the Subplane
//! engine operates on. It includes:
//!
//! - **Identifiers**: Interned element identifiers ([`identifier::Id`])
//! - **Geometry**: Points and bounds ([`geometry`] module)
//! - **Semantic**: The process tree ([`semantic`] module)
//! - **DI**: Diagram-interchange shapes, edges, planes and diagrams ([`di`] module)
//! - **Definitions**: The document root tying both sides together ([`definitions::Definitions`])

pub mod definitions;
pub mod di;
pub mod geometry;
pub mod identifier;
pub mod semantic;

mod error;

pub use error::{BindError, ModelError};
