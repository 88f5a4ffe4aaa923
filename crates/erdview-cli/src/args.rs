//! Command-line argument definitions for the erdview CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, export format and
//! scale, configuration file selection, and logging verbosity.

use clap::Parser;

use erdview::export::ExportFormat;

/// Command-line arguments for the erdview tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input erDiagram description
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Output file; its extension is replaced by the export format's
    #[arg(short, long)]
    pub output: Option<String>,

    /// Export format (svg, png); defaults to the output extension, then svg
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Device pixels per diagram unit for PNG export
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Diagram name used for the default output file name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Diagram version used for the default output file name
    #[arg(long, default_value = "1")]
    pub diagram_version: String,

    /// Entity or relation id to select, logging the resulting highlight
    #[arg(long)]
    pub select: Option<String>,

    /// Filter query, logging how many shapes stay visible
    #[arg(long)]
    pub query: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
