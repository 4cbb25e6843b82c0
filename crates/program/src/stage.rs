use std::fmt;
use std::path::Path;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::ProgramError;

/// Pipeline stage a shader source is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// WGSL source text plus a label used in diagnostics and GPU object names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: String,
    pub code: String,
}

impl ShaderSource {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }

    /// Read a WGSL file; the file name becomes the label.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let code = std::fs::read_to_string(path).map_err(|source| ProgramError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { label, code })
    }

    /// Parse and validate the source for `stage`.
    ///
    /// Fails with [`ProgramError::ShaderCompile`] when the source does not parse,
    /// does not validate, or has no entry point for `stage`.
    pub fn compile(&self, stage: ShaderStage) -> Result<CompiledStage, ProgramError> {
        let module = naga::front::wgsl::parse_str(&self.code)
            .map_err(|err| self.compile_error(stage, err.emit_to_string(&self.code)))?;

        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|err| self.compile_error(stage, error_chain(&err)))?;

        let entry_index = module
            .entry_points
            .iter()
            .position(|ep| ep.stage == stage.to_naga())
            .ok_or_else(|| {
                self.compile_error(stage, format!("error: module has no @{stage} entry point"))
            })?;
        let entry_point = module.entry_points[entry_index].name.clone();

        tracing::debug!(label = %self.label, %stage, %entry_point, "compiled shader stage");

        Ok(CompiledStage {
            stage,
            label: self.label.clone(),
            code: self.code.clone(),
            entry_point,
            entry_index,
            module,
        })
    }

    fn compile_error(&self, stage: ShaderStage, log: String) -> ProgramError {
        ProgramError::ShaderCompile {
            stage,
            label: self.label.clone(),
            log,
        }
    }
}

/// A parsed, validated shader stage.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub label: String,
    pub code: String,
    pub entry_point: String,
    pub module: naga::Module,
    entry_index: usize,
}

impl CompiledStage {
    /// The entry point this stage was compiled for.
    pub(crate) fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut log = format!("error: {err}");
    let mut source = err.source();
    while let Some(inner) = source {
        log.push_str(&format!("\n  caused by: {inner}"));
        source = inner.source();
    }
    log
}
