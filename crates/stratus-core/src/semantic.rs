//! Semantic diagram model types.
//!
//! These types describe a diagram as declared: what exists and how it is
//! grouped and connected, with no layout information.
//!
//! # Pipeline Position
//!
//! ```text
//! Canvas / Scope calls, or a TOML manifest
//!     ↓ declare
//! Semantic Model (these types)
//!     ↓ validate
//! Hierarchy (DiagramHierarchy)
//!     ↓ backend
//! Image bytes
//! ```
//!
//! # Organization
//!
//! - [`diagram`] - [`Diagram`], [`DiagramOptions`] and the option enums
//! - [`element`] - [`Node`], [`Cluster`], [`Edge`], [`Direction`], [`EdgeStyle`]

pub mod diagram;
pub mod element;

pub use diagram::*;
pub use element::*;
