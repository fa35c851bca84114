//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::Parser;

use aibom_pipeline::DocumentFormat;

/// Aibom -- generate an AI Bill of Materials for a local project.
///
/// Scans the project, submits a content-addressed bundle to the remote
/// analysis service and prints a CycloneDX 1.6 document to stdout.
#[derive(Parser, Debug)]
#[command(name = "aibom", version, about, long_about = None)]
pub struct Cli {
    /// Path to the project to analyze.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Acknowledge that this command is experimental (required).
    #[arg(long)]
    pub experimental: bool,

    /// Render a self-contained HTML report instead of CycloneDX JSON.
    #[arg(long)]
    pub html: bool,

    /// Print debug diagnostics on stderr.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Path to the aibom.toml configuration file.
    #[arg(short, long, default_value = "aibom.toml")]
    pub config: PathBuf,

    /// Previously known bundle id, enables the incremental extend path.
    #[arg(long)]
    pub bundle_id: Option<String>,
}

impl Cli {
    /// Selected output document format.
    pub fn document_format(&self) -> DocumentFormat {
        if self.html {
            DocumentFormat::Html
        } else {
            DocumentFormat::Json
        }
    }
}
