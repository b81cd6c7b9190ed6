//! Generate Go `net/http` server scaffolding from OpenAPI documents.
//!
//! ```no_run
//! use goapi_core::{GeneratorConfig, generate};
//!
//! let document = std::fs::read_to_string("openapi.yaml")?;
//! let source = generate(&document, &GeneratorConfig::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod gocode;
pub mod openapi;
pub mod output;

pub use config::{CONFIG_FILENAME, GeneratorConfig};
pub use error::{GenerateError, LoadError, Stage, SynthError};
pub use openapi::{GENERATED_HEADER, Generator, OpenApiSpec, generate, load_document, output_path};
pub use output::{BuiltinFormatter, FsWriter, Gofmt, MemoryWriter, OutputWriter, SourceFormatter};
