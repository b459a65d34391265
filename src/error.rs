use crate::mcp::errors;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed: {status}\nOutput: {output}")]
    Process {
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("{program} timed out after {}ms\nOutput: {output}", .elapsed.as_millis())]
    Timeout {
        program: String,
        elapsed: Duration,
        output: String,
    },

    #[error("{0}")]
    ArtifactMissing(String),

    #[error("invalid output from external script: {source}")]
    OutputFormat {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize result: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ToolError>,
    },
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ToolError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps the error with the operation it escaped from. The kind is kept.
    pub fn context(self, context: impl Into<String>) -> Self {
        ToolError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any context wrappers.
    pub fn root(&self) -> &ToolError {
        match self {
            ToolError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.root() {
            ToolError::Validation(_) => errors::INVALID_INPUT,
            ToolError::UnknownTool(_) => errors::UNKNOWN_TOOL,
            ToolError::Spawn { .. } | ToolError::Process { .. } => errors::PROCESS_FAILED,
            ToolError::Timeout { .. } => errors::TIMED_OUT,
            ToolError::ArtifactMissing(_) => errors::ARTIFACT_MISSING,
            ToolError::OutputFormat { .. } => errors::INVALID_OUTPUT,
            ToolError::Serialize(_) | ToolError::Io { .. } | ToolError::Context { .. } => {
                errors::INTERNAL_ERROR
            }
        }
    }
}

pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ToolError>;
}

impl<T> ResultExt<T> for Result<T, ToolError> {
    fn context(self, context: impl Into<String>) -> Result<T, ToolError> {
        self.map_err(|err| err.context(context))
    }
}
