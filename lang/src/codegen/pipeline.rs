//! Compilation pipeline tail: write the C translation unit next to the
//! input file and hand it to the external C compiler.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::emitter;
use crate::parser::ast::Node;

#[derive(Debug)]
pub enum CompileError {
    Io(io::Error),
    CompilerFailed {
        status: Option<i32>,
        stderr: String,
    },
}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        CompileError::Io(err)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io(err) => write!(f, "I/O error: {}", err),
            CompileError::CompilerFailed { status, stderr } => {
                match status {
                    Some(code) => write!(f, "C compiler failed with exit code {}", code)?,
                    None => write!(f, "C compiler was terminated")?,
                }
                if !stderr.is_empty() {
                    write!(f, "\n{}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Drives the external C compiler over the emitted translation unit
pub struct Compiler {
    cc: String,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            cc: "clang".to_string(),
        }
    }

    /// Use a different C compiler binary
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }

    /// Lower the tree and write `<input_basename>.c` next to the input.
    /// Returns the path of the written file.
    pub fn write_c_source(
        &self,
        source_path: &Path,
        nodes: &[Node],
    ) -> Result<PathBuf, CompileError> {
        let c_path = source_path.with_extension("c");
        let c_source = emitter::emit(nodes);
        std::fs::write(&c_path, c_source)?;
        Ok(c_path)
    }

    /// Write the C translation unit and invoke the C compiler to produce
    /// the executable. Returns the path of the written C file.
    pub fn compile_to_executable(
        &self,
        source_path: &Path,
        nodes: &[Node],
        output_path: &Path,
    ) -> Result<PathBuf, CompileError> {
        let c_path = self.write_c_source(source_path, nodes)?;

        let output = Command::new(&self.cc)
            .arg("-o")
            .arg(output_path)
            .arg(&c_path)
            .output()?;

        if !output.status.success() {
            return Err(CompileError::CompilerFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(c_path)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
