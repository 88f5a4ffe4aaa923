//! Error types for erdview operations.
//!
//! This module provides the main error type [`ErdViewError`] which wraps the
//! render and export failures a host can surface to the user.

use std::io;

use thiserror::Error;

use crate::{adapter::RenderError, export::ExportError};

/// The main error type for erdview operations.
///
/// None of these are fatal to the host: a failed render leaves the previous
/// scene in place and a failed export writes nothing.
#[derive(Debug, Error)]
pub enum ErdViewError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),
}
