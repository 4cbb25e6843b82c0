use std::path::PathBuf;

use crate::stage::ShaderStage;

/// Errors from loading, compiling and linking a program.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("failed to read shader {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader `{label}` failed to compile:\n{log}")]
    ShaderCompile {
        stage: ShaderStage,
        label: String,
        log: String,
    },
    #[error("program failed to link:\n{log}")]
    ProgramLink { log: String },
}

impl ProgramError {
    /// Diagnostic text reported by the shader front end or the GPU validator.
    pub fn info_log(&self) -> Option<&str> {
        match self {
            Self::ShaderCompile { log, .. } | Self::ProgramLink { log } => Some(log),
            Self::Read { .. } => None,
        }
    }
}
