//! Stratus Core Types and Definitions
//!
//! This crate provides the foundational types for Stratus architecture
//! diagrams:
//!
//! - **Identifiers**: string-interned identifiers ([`identifier::Id`])
//! - **Colors**: CSS color parsing with hex output ([`color::Color`])
//! - **Categories**: node kinds and the built-in catalog ([`category`] module)
//! - **Semantic**: the declared diagram model ([`semantic`] module)

pub mod category;
pub mod color;
pub mod identifier;
pub mod semantic;
