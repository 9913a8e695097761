use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to decode document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Unknown target `{0}` (supported: grub)")]
    UnknownTarget(String),

    #[error("Unsupported gate kind `{kind}` for cell `{cell}` in module `{module}`")]
    UnsupportedGateKind {
        module: String,
        cell: String,
        kind: String,
    },

    #[error("Malformed connection `{role}` on cell `{cell}` in module `{module}`: {detail}")]
    MalformedConnection {
        module: String,
        cell: String,
        role: String,
        detail: String,
    },

    #[error("Malformed bit in signal `{signal}` of module `{module}`: {detail}")]
    MalformedSignal {
        module: String,
        signal: String,
        detail: String,
    },

    #[error("Default override for `{signal}` in module `{module}` is invalid: {detail}")]
    InvalidDefaultOverride {
        module: String,
        signal: String,
        detail: String,
    },

    #[error("Initial value of `{signal}` in module `{module}` is invalid: {detail}")]
    InvalidInitialValue {
        module: String,
        signal: String,
        detail: String,
    },

    #[error("Target `{target}` has no primitive for `{kind}` (cell `{cell}` in module `{module}`)")]
    UnsupportedTarget {
        module: String,
        cell: String,
        kind: String,
        target: &'static str,
    },

    #[error("Trace signal `{signal}` is not a visible signal of module `{module}`")]
    UnknownTraceSignal { module: String, signal: String },
}

impl CompileError {
    /// The module the error was raised for, if it is module-scoped.
    pub fn module(&self) -> Option<&str> {
        match self {
            CompileError::Document(_) | CompileError::UnknownTarget(_) => None,
            CompileError::UnsupportedGateKind { module, .. }
            | CompileError::MalformedConnection { module, .. }
            | CompileError::MalformedSignal { module, .. }
            | CompileError::InvalidDefaultOverride { module, .. }
            | CompileError::InvalidInitialValue { module, .. }
            | CompileError::UnsupportedTarget { module, .. }
            | CompileError::UnknownTraceSignal { module, .. } => Some(module),
        }
    }
}
