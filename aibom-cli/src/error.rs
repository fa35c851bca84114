//! CLI-specific error type and exit code mapping

use aibom_core::error::AibomError;
use aibom_pipeline::PipelineError;

/// CLI-specific error type.
///
/// Every failure the command can end with. The classified pipeline kinds keep
/// their stable `AIBOM-XXXX` codes in the rendered message.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Classified domain error (gate, scan, bundle, analysis, config, io).
    #[error("{0}")]
    Aibom(#[from] AibomError),

    /// IO error while writing the document to stdout.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// The command exits 0 on success and 2 on every classified failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Aibom(err) => err.exit_code(),
            Self::Io(_) => 2,
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        Self::Aibom(err.into())
    }
}
