//! erdview Core Types and Definitions
//!
//! This crate provides the foundational types shared by the erdview crates:
//!
//! - **Geometry**: Points, sizes and axis-aligned bounds ([`geometry`] module)
//! - **Colors**: CSS color parsing ([`color::Color`])
//! - **Scene**: The immutable rendered scene of entities and relations ([`scene`] module)

pub mod color;
pub mod geometry;
pub mod scene;
