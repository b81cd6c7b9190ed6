//! Go code generation for OpenAPI documents.
//!
//! The pipeline is:
//! 1. Load: JSON/YAML -> OpenApiSpec
//! 2. Normalize: OpenApiSpec -> ApiModel (all OpenAPI logic resolved)
//! 3. Structs, parameters, handlers, helpers: ApiModel -> FileBuilder
//! 4. Build + format: FileBuilder -> GoFile -> String
//!
//! A failing stage aborts the document and the error names the stage.

use std::path::{Path, PathBuf};

use tracing::{debug, debug_span, info, info_span, warn};

use super::ir::api::{FileFeatures, ParamLocation};
use super::ir::{
    HandlerOptions, TypeContext, normalize_spec, synthesize_handlers, synthesize_helpers,
    synthesize_params, synthesize_structs,
};
use super::loader::load_document;
use super::spec::OpenApiSpec;
use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Stage, StageExt, SynthError};
use crate::gocode::{FileBuilder, GoFile};
use crate::output::{BuiltinFormatter, OutputWriter, SourceFormatter};

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "Code generated by goapi. DO NOT EDIT.";

/// Runs the pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the Go file for one document.
    pub fn generate(&self, spec: Option<&OpenApiSpec>) -> Result<GoFile, GenerateError> {
        let config = &self.config;
        let _span = info_span!("generate", package = %config.package).entered();

        let model = run_stage(Stage::Normalize, || {
            if config.package.trim().is_empty() {
                return Err(SynthError::EmptyName { what: "package" });
            }
            normalize_spec(spec)
        })?;
        if model.routes.is_empty() {
            warn!("document has no operations, emitting handler scaffolding only");
        }

        let ctx = TypeContext {
            use_pointers: config.use_pointers,
        };
        let mut file = FileBuilder::new(config.package.as_str())
            .with_local_prefix(config.local_prefix.as_str())
            .with_header(GENERATED_HEADER);
        let mut features = FileFeatures::default();

        run_stage(Stage::Structs, || {
            synthesize_structs(&mut file, &model.schemas, ctx, &mut features)
        })?;

        run_stage(Stage::Parameters, || {
            for route in &model.routes {
                for location in ParamLocation::ALL {
                    synthesize_params(
                        &mut file,
                        &route.handler_name,
                        location,
                        &route.parameters,
                        ctx,
                        &config.handler_struct,
                        &mut features,
                    )?;
                }
            }
            Ok(())
        })?;

        let opts = HandlerOptions {
            service_interface: config.service_interface.clone(),
            handler_struct: config.handler_struct.clone(),
            validator_import: config.validator_import.clone(),
            validator_package: config.validator_package().to_string(),
            ctx,
        };
        run_stage(Stage::Handlers, || {
            synthesize_handlers(&mut file, &model.routes, &opts, &mut features)
        })?;

        run_stage(Stage::Helpers, || {
            synthesize_helpers(&mut file, &features, &opts.validator_package)
        })?;

        let built = file.build();
        info!(
            title = model.title.as_deref().unwrap_or("untitled"),
            schemas = model.schemas.len(),
            routes = model.routes.len(),
            decls = built.decls.len(),
            "generated Go file"
        );
        Ok(built)
    }

    /// Build and format one document.
    pub fn render(
        &self,
        spec: Option<&OpenApiSpec>,
        formatter: &dyn SourceFormatter,
    ) -> Result<String, GenerateError> {
        let file = self.generate(spec)?;
        formatter.format(&file)
    }

    /// Load `input`, generate it, and hand the result to `writer`.
    /// Returns the output path.
    pub fn generate_file(
        &self,
        input: &Path,
        out_dir: &Path,
        formatter: &dyn SourceFormatter,
        writer: &mut dyn OutputWriter,
    ) -> Result<PathBuf, GenerateError> {
        let spec = load_document(input)?;
        let source = self.render(Some(&spec), formatter)?;
        let path = output_path(input, out_dir, &self.config.file_suffix);
        writer.write(&path, &source)?;
        info!(input = %input.display(), output = %path.display(), "generated");
        Ok(path)
    }
}

fn run_stage<T>(
    stage: Stage,
    f: impl FnOnce() -> Result<T, SynthError>,
) -> Result<T, GenerateError> {
    let _span = debug_span!("stage", %stage).entered();
    let result = f().at_stage(stage);
    if result.is_ok() {
        debug!("stage complete");
    }
    result
}

/// `<out_dir>/<input stem><suffix>`
pub fn output_path(input: &Path, out_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "api".to_string());
    out_dir.join(format!("{stem}{suffix}"))
}

/// Generate Go source from an OpenAPI JSON or YAML string.
pub fn generate(document: &str, config: &GeneratorConfig) -> Result<String, GenerateError> {
    let spec = OpenApiSpec::parse(document, None)?;
    Generator::new(config.clone()).render(Some(&spec), &BuiltinFormatter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("specs/petstore.yaml"), Path::new("gen"), ".gen.go"),
            PathBuf::from("gen/petstore.gen.go")
        );
        assert_eq!(
            output_path(Path::new("openapi.json"), Path::new("."), "_api.go"),
            PathBuf::from("./openapi_api.go")
        );
    }

    #[test]
    fn test_missing_document_fails_in_normalize() {
        let err = Generator::default().generate(None).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Normalize));
        assert!(matches!(
            err,
            GenerateError::Stage {
                source: SynthError::MissingDocument,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_package_is_input_error() {
        let config = GeneratorConfig {
            package: String::new(),
            ..GeneratorConfig::default()
        };
        let spec = OpenApiSpec::from_json(r#"{"openapi":"3.0.0","paths":{}}"#).unwrap();
        let err = Generator::new(config).generate(Some(&spec)).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Normalize));
    }

    #[test]
    fn test_empty_service_name_fails_in_handlers() {
        let config = GeneratorConfig {
            service_interface: String::new(),
            ..GeneratorConfig::default()
        };
        let spec = OpenApiSpec::from_json(r#"{"openapi":"3.0.0","paths":{}}"#).unwrap();
        let err = Generator::new(config).generate(Some(&spec)).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Handlers));
    }

    #[test]
    fn test_header_and_package() {
        let out = generate(r#"{"openapi":"3.0.0","paths":{}}"#, &GeneratorConfig::default()).unwrap();
        assert!(out.starts_with("// Code generated by goapi. DO NOT EDIT.\n\npackage api\n"));
    }
}
