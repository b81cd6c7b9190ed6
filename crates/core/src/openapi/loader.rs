//! Document loading: JSON or YAML, from a string or a file.

use std::path::Path;

use tracing::debug;

use super::spec::OpenApiSpec;
use crate::error::LoadError;

/// Source syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from the file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }

    /// JSON documents start with `{`; anything else is treated as YAML.
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            DocumentFormat::Json
        } else {
            DocumentFormat::Yaml
        }
    }
}

impl OpenApiSpec {
    /// Parse an OpenAPI spec from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Parse an OpenAPI spec from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(yaml).map_err(|e| LoadError::Parse {
            format: "YAML",
            message: e.to_string(),
        })
    }

    /// Parse with an explicit format, or sniff the content when none is given.
    pub fn parse(content: &str, format: Option<DocumentFormat>) -> Result<Self, LoadError> {
        match format.unwrap_or_else(|| DocumentFormat::sniff(content)) {
            DocumentFormat::Json => Self::from_json(content),
            DocumentFormat::Yaml => Self::from_yaml(content),
        }
    }
}

/// Read and parse a document from disk.
pub fn load_document(path: &Path) -> Result<OpenApiSpec, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    debug!(path = %path.display(), ?format, bytes = content.len(), "loading OpenAPI document");
    OpenApiSpec::parse(&content, format)
}
