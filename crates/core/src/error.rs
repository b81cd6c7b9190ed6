use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Structs,
    Parameters,
    Handlers,
    Helpers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Normalize => "normalize",
            Stage::Structs => "structs",
            Stage::Parameters => "parameters",
            Stage::Handlers => "handlers",
            Stage::Helpers => "helpers",
        };
        f.write_str(name)
    }
}

/// Input-data errors raised by normalization and the synthesizers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// No document was supplied.
    #[error("no OpenAPI document supplied")]
    MissingDocument,
    /// A declaration would have an empty name.
    #[error("{what} name must not be empty")]
    EmptyName {
        /// Kind of declaration being named.
        what: &'static str,
    },
    /// A named schema has no schema body.
    #[error("schema `{name}` has no definition")]
    MissingSchema { name: String },
    /// Two schemas map to the same Go type name.
    #[error("schema name `{name}` is defined more than once")]
    DuplicateSchema { name: String },
    /// A parameter list repeats a (name, location) pair.
    #[error("parameter `{name}` in {location} is declared twice for {operation}")]
    DuplicateParameter {
        name: String,
        location: String,
        operation: String,
    },
    /// A `$ref` points outside the supported components.
    #[error("unresolved reference `{reference}`")]
    UnresolvedRef { reference: String },
    /// Two operations derive the same handler name.
    #[error("handler name `{name}` is derived by both {first} and {second}")]
    DuplicateHandler {
        name: String,
        first: String,
        second: String,
    },
    /// A parameter uses a location other than query, header, path or cookie.
    #[error("parameter `{name}` has unsupported location `{location}`")]
    UnsupportedLocation { name: String, location: String },
}

/// Errors raised while reading an OpenAPI document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse OpenAPI {format} document: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Top-level error of one generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A pipeline stage rejected the document.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: SynthError,
    },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("formatter failed: {0}")]
    Format(String),
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl GenerateError {
    /// Stage that failed, for stage-tagged errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GenerateError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Attach a stage to synthesizer results.
pub trait StageExt<T> {
    fn at_stage(self, stage: Stage) -> Result<T, GenerateError>;
}

impl<T> StageExt<T> for Result<T, SynthError> {
    fn at_stage(self, stage: Stage) -> Result<T, GenerateError> {
        self.map_err(|source| GenerateError::Stage { stage, source })
    }
}
