//! Galileo Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Galileo pipeline
//! client crates. It includes:
//!
//! - **Identifiers**: Backend-assigned node identifiers ([`identifier::NodeId`])
//! - **Kinds**: The four pipeline node kinds ([`kind::NodeKind`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Model**: Serde mirrors of the backend's entities ([`model`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod kind;
pub mod model;
