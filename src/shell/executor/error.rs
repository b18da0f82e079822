use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("Error executing '{name}': {source}")]
    Process { name: String, source: io::Error },
    #[error("{path}: {source}")]
    Redirect { path: String, source: io::Error },
    #[error("{name}: {source}")]
    Builtin { name: String, source: io::Error },
}

impl ExecError {
    pub fn process(name: &str, source: io::Error) -> Self {
        ExecError::Process {
            name: name.to_string(),
            source,
        }
    }
}
