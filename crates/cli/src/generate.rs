use clap::Args;
use similar::{ChangeTag, TextDiff};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use goapi_core::{
    BuiltinFormatter, FsWriter, GenerateError, Generator, GeneratorConfig, Gofmt, MemoryWriter,
    SourceFormatter,
};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// OpenAPI documents to generate from (JSON or YAML)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
    /// Directory the generated files are written to
    #[arg(long, short, value_name = "DIR")]
    pub out: PathBuf,
    /// Config file to use instead of ./goapi.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Go package name
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,
    /// Module prefix of first-party imports
    #[arg(long = "local-prefix", value_name = "PREFIX")]
    pub local_prefix: Option<String>,
    /// Use zero values instead of pointers for optional fields
    #[arg(long = "no-pointers")]
    pub no_pointers: bool,
    /// Pipe output through gofmt
    #[arg(long)]
    pub gofmt: bool,
    /// Fail if any generated file is missing or out of date
    #[arg(long, conflicts_with = "dry_run")]
    pub check: bool,
    /// Print generated source to stdout instead of writing files
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

pub fn run(args: GenerateArgs) -> i32 {
    match execute(&args) {
        Ok(0) => 0,
        Ok(stale) => {
            eprintln!("{stale} generated file(s) are out of date, run `goapi generate` to update");
            1
        }
        Err(err) => {
            eprintln!("error: {}", error_chain(&err));
            1
        }
    }
}

/// Generate every input. Returns the number of stale files in check mode.
fn execute(args: &GenerateArgs) -> Result<usize, GenerateError> {
    let config = resolve_config(args)?;
    let formatter: Box<dyn SourceFormatter> = if args.gofmt {
        Box::new(Gofmt::locate()?)
    } else {
        Box::new(BuiltinFormatter)
    };
    let generator = Generator::new(config);

    if !args.check && !args.dry_run {
        for input in &args.inputs {
            let path = generator.generate_file(input, &args.out, formatter.as_ref(), &mut FsWriter)?;
            println!("generated {}", path.display());
        }
        return Ok(0);
    }

    let mut writer = MemoryWriter::new();
    for input in &args.inputs {
        generator.generate_file(input, &args.out, formatter.as_ref(), &mut writer)?;
    }

    if args.dry_run {
        for (_, source) in writer.files() {
            print!("{source}");
        }
        return Ok(0);
    }

    let mut stale = 0;
    for (path, source) in writer.files() {
        let existing = fs::read_to_string(path).ok();
        if existing.as_deref() == Some(source) {
            debug!(path = %path.display(), "up to date");
            continue;
        }
        stale += 1;
        match existing {
            Some(existing) => eprint!("{}", render_diff(path, &existing, source)),
            None => eprintln!("missing: {}", path.display()),
        }
    }
    info!(files = writer.len(), stale, "check complete");
    Ok(stale)
}

/// Config file (explicit or discovered), then flag overrides.
fn resolve_config(args: &GenerateArgs) -> Result<GeneratorConfig, GenerateError> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::discover(Path::new("."))?,
    };
    if let Some(package) = &args.package {
        config.package.clone_from(package);
    }
    if let Some(prefix) = &args.local_prefix {
        config.local_prefix.clone_from(prefix);
    }
    if args.no_pointers {
        config.use_pointers = false;
    }
    Ok(config)
}

fn render_diff(path: &Path, existing: &str, generated: &str) -> String {
    let diff = TextDiff::from_lines(existing, generated);
    let mut output = String::new();

    output.push_str(&format!("\x1b[1m--- {} (current)\x1b[0m\n", path.display()));
    output.push_str(&format!("\x1b[1m+++ {} (generated)\x1b[0m\n", path.display()));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", "\x1b[31m"),
                    ChangeTag::Insert => ("+", "\x1b[32m"),
                    ChangeTag::Equal => (" ", ""),
                };
                output.push_str(color);
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
                if !color.is_empty() {
                    output.push_str("\x1b[0m");
                }
            }
        }
    }
    output
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // thiserror messages often embed their source already
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
